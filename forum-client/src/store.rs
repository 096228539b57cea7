use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{self, CommentId},
    Error,
};

/// The external comment store, as seen from the client
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Every comment, in no particular order
    async fn fetch_comments(&self) -> Result<Vec<api::Comment>, Error>;

    /// Persists a comment that has no id yet. The store assigns the id and the
    /// canonical timestamp.
    async fn create_comment(&self, comment: api::Comment) -> Result<(), Error>;

    async fn set_upvotes(&self, id: CommentId, upvotes: u32) -> Result<(), Error>;
}

#[async_trait]
impl<T: ?Sized + CommentStore> CommentStore for Arc<T> {
    async fn fetch_comments(&self) -> Result<Vec<api::Comment>, Error> {
        (**self).fetch_comments().await
    }

    async fn create_comment(&self, comment: api::Comment) -> Result<(), Error> {
        (**self).create_comment(comment).await
    }

    async fn set_upvotes(&self, id: CommentId, upvotes: u32) -> Result<(), Error> {
        (**self).set_upvotes(id, upvotes).await
    }
}
