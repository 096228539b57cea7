use crate::Error;

/// Name shown for comments posted without a username
pub const DEFAULT_USERNAME: &str = "Anonymous";

pub const MIN_COMMENT_LEN: usize = 10;
pub const MAX_COMMENT_LEN: usize = 255;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub u64);

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment as the comment store sends and receives it
///
/// `comment_date` is kept as the raw ISO-8601 string, conversion to a `Time` is
/// up to the consumer.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Absent until the store has persisted the comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommentId>,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub avatar: String,

    pub comment_date: String,

    pub comment_text: String,

    #[serde(default)]
    pub upvotes: u32,

    /// `None` for a top-level comment
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,
}

fn default_username() -> String {
    String::from(DEFAULT_USERNAME)
}

/// Body of `GET /comments`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

/// Body of `POST /comments`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub comment: Comment,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Upvotes {
    pub upvotes: u32,
}

/// Body of `PATCH /comments/{id}`
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UpvotesUpdate {
    pub comment: Upvotes,
}

impl UpvotesUpdate {
    pub fn new(upvotes: u32) -> UpvotesUpdate {
        UpvotesUpdate {
            comment: Upvotes { upvotes },
        }
    }
}

/// Input-boundary check for comment text. The store itself does not enforce it.
pub fn validate_comment_text(text: &str) -> Result<(), Error> {
    let len = text.chars().count();
    if len < MIN_COMMENT_LEN {
        return Err(Error::InvalidText(format!(
            "comment must be at least {MIN_COMMENT_LEN} characters, got {len}"
        )));
    }
    if len > MAX_COMMENT_LEN {
        return Err(Error::InvalidText(format!(
            "comment must be at most {MAX_COMMENT_LEN} characters, got {len}"
        )));
    }
    Ok(())
}
