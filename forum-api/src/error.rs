use anyhow::{anyhow, Context};
use serde_json::json;

use crate::CommentId;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Comment not found {0}")]
    CommentNotFound(CommentId),

    #[error("Invalid comment text: {0}")]
    InvalidText(String),

    #[error("Invalid comment id: {0:?}")]
    InvalidCommentId(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidText(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCommentId(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::CommentNotFound(id) => json!({
                "message": "comment not found",
                "type": "comment-not-found",
                "id": id,
            }),
            Error::InvalidText(msg) => json!({
                "message": msg,
                "type": "invalid-text",
            }),
            Error::InvalidCommentId(id) => json!({
                "message": "invalid comment id",
                "type": "invalid-comment-id",
                "id": id,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(message()),
                "comment-not-found" => Error::CommentNotFound(CommentId(
                    data.get("id")
                        .and_then(|id| id.as_u64())
                        .ok_or_else(|| anyhow!("error is a missing comment without an id"))?,
                )),
                "invalid-text" => Error::InvalidText(message()),
                "invalid-comment-id" => Error::InvalidCommentId(String::from(
                    data.get("id").and_then(|id| id.as_str()).unwrap_or(""),
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
