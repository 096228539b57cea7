use crate::{api::CommentId, StatusCode};

/// Everything that can go wrong talking to the comment store
///
/// Kept `Clone` so that the sync state machine can hold on to the last failure.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The store could not be reached at all
    #[error("{0}")]
    Transport(String),

    /// The store answered with a non-success status
    #[error("{} Error message: {body}", status_text(.status))]
    Protocol { status: StatusCode, body: String },

    /// The store answered something we could not make sense of
    #[error("Malformed data: {0}")]
    Malformed(String),

    #[error("Comment {0} is not currently loaded")]
    UnknownComment(CommentId),
}

fn status_text(status: &StatusCode) -> &str {
    match status.canonical_reason() {
        Some(reason) => reason,
        None => status.as_str(),
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        if err.is_decode() {
            Error::Malformed(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}
