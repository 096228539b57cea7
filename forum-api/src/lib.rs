use chrono::{SecondsFormat, Utc};

pub type Time = chrono::DateTime<Utc>;

mod comment;
pub use comment::{
    validate_comment_text, Comment, CommentId, CommentList, NewComment, Upvotes, UpvotesUpdate,
    DEFAULT_USERNAME, MAX_COMMENT_LEN, MIN_COMMENT_LEN,
};

mod error;
pub use error::Error;

mod feed;
pub use feed::FeedMessage;

/// Formats a timestamp the way it travels on the wire, eg. `2024-01-02T03:04:05.000Z`
pub fn format_time(t: &Time) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
