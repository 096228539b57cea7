use crate::{
    api::{self, CommentId},
    tree, AvatarGenerator, Comment, CommentFields, CommentStore, ComposeTarget, Error,
    RandomAvatars, ReconcilePolicy, Thread, UiState,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyncState {
    /// Nothing was requested yet
    Idle,

    Loading,

    Loaded,

    /// The last load failed. The next load attempt starts over from `Loading`.
    Failed(Error),
}

/// Identifies one load. Loads are numbered in the order they were started.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct LoadTicket(u64);

/// The forum as one view sees it: the last fetched comment set, the transient
/// view state that goes with it, and the sync state machine driving both
///
/// Every change goes through the store and is followed by a full re-fetch, the
/// local comment set is never patched in place.
pub struct Forum<S> {
    store: S,
    state: SyncState,
    comments: Vec<Comment>,
    ui: UiState,
    avatars: Box<dyn AvatarGenerator>,
    last_ticket: u64,
}

impl<S: CommentStore> Forum<S> {
    pub fn new(store: S) -> Forum<S> {
        Forum::with_avatars(store, Box::new(RandomAvatars::new()), ReconcilePolicy::default())
    }

    pub fn with_avatars(
        store: S,
        mut avatars: Box<dyn AvatarGenerator>,
        policy: ReconcilePolicy,
    ) -> Forum<S> {
        let ui = UiState::new(policy, &mut *avatars);
        Forum {
            store,
            state: SyncState::Idle,
            comments: Vec::new(),
            ui,
            avatars,
            last_ticket: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// All loaded comments, most recent first
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == Some(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Comment> {
        tree::roots(&self.comments)
    }

    pub fn replies(&self, root: &Comment) -> Vec<&Comment> {
        tree::children_of(root, &self.comments)
    }

    pub fn threads(&self) -> Vec<Thread<'_>> {
        tree::threads(&self.comments)
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn set_draft(&mut self, target: ComposeTarget, text: String) -> bool {
        self.ui.set_draft(target, text)
    }

    /// Shows the reply box under `root`. Returns false if `root` is not a
    /// currently loaded root comment.
    pub fn open_reply(&mut self, root: CommentId) -> bool {
        self.ui.open_reply(root)
    }

    /// Marks the start of a load. Results of loads started before the latest one
    /// will be discarded by `finish_load`.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.last_ticket += 1;
        self.state = SyncState::Loading;
        LoadTicket(self.last_ticket)
    }

    /// Applies the outcome of a fetch. Returns whether it was applied, ie. whether
    /// no load was started after this one.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<Vec<api::Comment>, Error>,
    ) -> bool {
        if ticket.0 < self.last_ticket {
            tracing::debug!(
                ?ticket,
                latest = self.last_ticket,
                "discarding result of superseded load"
            );
            return false;
        }
        let converted = fetched.and_then(|comments| {
            comments
                .into_iter()
                .map(Comment::try_from)
                .collect::<Result<Vec<_>, _>>()
        });
        match converted {
            Ok(mut comments) => {
                tree::sort_by_recency(&mut comments);
                self.ui.reconcile(&comments, &mut *self.avatars);
                tracing::debug!(num_comments = comments.len(), "loaded comments");
                self.comments = comments;
                self.state = SyncState::Loaded;
            }
            Err(err) => {
                tracing::warn!(?err, "failed loading comments");
                self.state = SyncState::Failed(err);
            }
        }
        true
    }

    /// Runs one full sync cycle: fetch, sort, rebuild view state
    pub async fn refresh(&mut self) {
        let ticket = self.begin_load();
        let fetched = self.store.fetch_comments().await;
        self.finish_load(ticket, fetched);
    }

    /// Submits the text of the `target` compose box as a new comment, then
    /// re-syncs. On success, the draft is emptied and a reply box gets closed.
    pub async fn try_create_comment(&mut self, target: ComposeTarget) -> Result<(), Error> {
        if let ComposeTarget::Reply(root) = target {
            if !self.ui.keys().contains(&target) {
                return Err(Error::UnknownComment(root));
            }
        }
        let draft = Comment::draft(CommentFields {
            avatar: self.ui.avatar(target).map(String::from).unwrap_or_default(),
            text: self.ui.draft(target).to_owned(),
            parent_id: target.parent_id(),
            ..CommentFields::default()
        });
        self.store.create_comment(draft.to_api()).await?;
        self.ui.set_draft(target, String::new());
        if let ComposeTarget::Reply(root) = target {
            self.ui.close_reply(root);
        }
        self.refresh().await;
        Ok(())
    }

    /// Same as `try_create_comment`, but failures only end up in the logs and
    /// the view keeps showing the previous comment set
    pub async fn create_comment(&mut self, target: ComposeTarget) {
        if let Err(err) = self.try_create_comment(target).await {
            tracing::error!(?err, ?target, "failed creating comment");
        }
    }

    /// Sends the loaded upvote count of `id` plus one, then re-syncs
    pub async fn try_upvote(&mut self, id: CommentId) -> Result<(), Error> {
        let upvotes = self
            .comment(id)
            .ok_or(Error::UnknownComment(id))?
            .upvotes
            .saturating_add(1);
        self.store.set_upvotes(id, upvotes).await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn upvote(&mut self, id: CommentId) {
        if let Err(err) = self.try_upvote(id).await {
            tracing::error!(?err, %id, "failed upvoting comment");
        }
    }
}
