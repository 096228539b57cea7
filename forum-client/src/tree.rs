//! Rebuilds the two-level thread structure out of the flat comment list
//!
//! Nothing here is cached: the flat list is the only source of truth, and
//! threads are recomputed from it every time they are needed.

use std::{cmp::Reverse, collections::HashMap};

use crate::{api::CommentId, Comment};

/// Most recent first. The sort is stable, so comments with the same date keep
/// the order in which they were fetched.
pub fn sort_by_recency(comments: &mut [Comment]) {
    comments.sort_by_key(|c| Reverse(c.date));
}

pub fn roots(comments: &[Comment]) -> impl Iterator<Item = &Comment> {
    comments.iter().filter(|c| c.is_root())
}

/// All comments directly answering `root`, in the order of `comments`
///
/// A draft root has no replies, and a comment never counts as its own reply.
pub fn children_of<'a>(root: &Comment, comments: &'a [Comment]) -> Vec<&'a Comment> {
    let root_id = match root.id {
        None => return Vec::new(),
        Some(id) => id,
    };
    comments
        .iter()
        .filter(|c| c.parent_id == Some(root_id) && c.id != Some(root_id))
        .collect()
}

pub fn has_replies(root: &Comment, comments: &[Comment]) -> bool {
    root.id.map_or(false, |root_id| {
        comments
            .iter()
            .any(|c| c.parent_id == Some(root_id) && c.id != Some(root_id))
    })
}

/// Replies grouped by parent, computed in a single pass over the comment list
///
/// Gives the same answers as `children_of`, without re-scanning the whole list
/// for every root.
#[derive(Clone, Debug, Default)]
pub struct ThreadIndex {
    children: HashMap<CommentId, Vec<usize>>,
}

impl ThreadIndex {
    pub fn build(comments: &[Comment]) -> ThreadIndex {
        let mut children = HashMap::<CommentId, Vec<usize>>::new();
        for (i, c) in comments.iter().enumerate() {
            if let Some(parent) = c.parent_id {
                if c.id != Some(parent) {
                    children.entry(parent).or_default().push(i);
                }
            }
        }
        ThreadIndex { children }
    }

    /// `comments` should be the list this index was built from. Positions that
    /// fall outside of it are skipped.
    pub fn children<'a>(&self, root: &Comment, comments: &'a [Comment]) -> Vec<&'a Comment> {
        root.id
            .and_then(|id| self.children.get(&id))
            .map(|idx| idx.iter().filter_map(|&i| comments.get(i)).collect())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Thread<'a> {
    pub root: &'a Comment,
    pub replies: Vec<&'a Comment>,
}

impl<'a> Thread<'a> {
    /// Whether the thread connector below the root should be drawn
    pub fn has_replies(&self) -> bool {
        !self.replies.is_empty()
    }
}

/// Every root of `comments` along with its replies, in the order of `comments`
pub fn threads(comments: &[Comment]) -> Vec<Thread<'_>> {
    let index = ThreadIndex::build(comments);
    roots(comments)
        .map(|root| Thread {
            root,
            replies: index.children(root, comments),
        })
        .collect()
}
