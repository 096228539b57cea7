use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request,
};
use forum_api::CommentId;

use crate::{db::CommentDb, feeds::Feeds, Error};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: CommentDb,
    pub feeds: Feeds,
}

/// The `:id` segment of a comment route
pub struct CommentPath(pub CommentId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CommentPath {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &S) -> Result<CommentPath, Error> {
        let Path(id) = Path::<String>::from_request_parts(req, state)
            .await
            .map_err(|err| Error::invalid_comment_id(err.body_text()))?;
        let parsed = id
            .parse::<u64>()
            .map_err(|_| Error::invalid_comment_id(id.clone()))?;
        Ok(CommentPath(CommentId(parsed)))
    }
}
