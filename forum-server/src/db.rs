use std::{path::Path, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use forum_api::{Comment, CommentId, CommentList};
use tokio::sync::RwLock;

use crate::Error;

/// In-memory comment table. Comments live as long as the process.
#[derive(Clone, Debug)]
pub struct CommentDb(Arc<RwLock<Table>>);

#[derive(Debug)]
struct Table {
    comments: Vec<Comment>,
    next_id: u64,
}

impl Table {
    fn allocate_id(&mut self) -> CommentId {
        let id = CommentId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl CommentDb {
    pub fn new() -> CommentDb {
        CommentDb::with_comments(Vec::new())
    }

    /// Starts with `comments` already stored. Comments without an id get one.
    pub fn with_comments(comments: Vec<Comment>) -> CommentDb {
        let mut table = Table {
            comments: Vec::with_capacity(comments.len()),
            next_id: comments
                .iter()
                .filter_map(|c| c.id)
                .map(|id| id.0 + 1)
                .max()
                .unwrap_or(1),
        };
        for mut c in comments {
            if c.id.is_none() {
                c.id = Some(table.allocate_id());
            }
            table.comments.push(c);
        }
        CommentDb(Arc::new(RwLock::new(table)))
    }

    /// Loads a seed file holding a `{"comments": [...]}` document
    pub async fn load_seed(path: &Path) -> anyhow::Result<CommentDb> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading seed file {path:?}"))?;
        let list: CommentList = serde_json::from_slice(&data)
            .with_context(|| format!("parsing seed file {path:?}"))?;
        tracing::info!(num_comments = list.comments.len(), ?path, "loaded seed comments");
        Ok(CommentDb::with_comments(list.comments))
    }

    pub async fn fetch_comments(&self) -> Vec<Comment> {
        self.0.read().await.comments.clone()
    }

    /// Stores `comment` with a fresh id and the current time, and returns it as stored
    pub async fn create_comment(&self, comment: Comment) -> Comment {
        let mut table = self.0.write().await;
        let comment = Comment {
            id: Some(table.allocate_id()),
            comment_date: forum_api::format_time(&Utc::now()),
            ..comment
        };
        table.comments.push(comment.clone());
        comment
    }

    pub async fn set_upvotes(&self, id: CommentId, upvotes: u32) -> Result<Comment, Error> {
        let mut table = self.0.write().await;
        let comment = table
            .comments
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| Error::comment_not_found(id))?;
        comment.upvotes = upvotes;
        Ok(comment.clone())
    }
}
