use std::collections::{BTreeSet, HashMap};

use crate::{api::CommentId, tree, AvatarGenerator, Comment};

/// Which compose box a piece of transient view state belongs to
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ComposeTarget {
    /// The box for starting a new thread
    TopLevel,

    /// The box for replying to the given root comment
    Reply(CommentId),
}

impl ComposeTarget {
    pub fn parent_id(&self) -> Option<CommentId> {
        match self {
            ComposeTarget::TopLevel => None,
            ComposeTarget::Reply(id) => Some(*id),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReconcilePolicy {
    /// Keep the text typed in compose boxes that survive a sync. When unset, every
    /// sync empties all compose boxes, including the one the user is typing in.
    pub preserve_drafts: bool,
}

/// Transient per-thread view state: draft text, reply box visibility and the
/// placeholder avatar shown next to each compose box
///
/// After `reconcile`, all three maps hold exactly `TopLevel` plus one key per
/// root comment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UiState {
    policy: ReconcilePolicy,
    drafts: HashMap<ComposeTarget, String>,
    reply_open: HashMap<ComposeTarget, bool>,
    avatars: HashMap<ComposeTarget, String>,
}

impl UiState {
    pub fn new(policy: ReconcilePolicy, avatars: &mut dyn AvatarGenerator) -> UiState {
        let mut res = UiState {
            policy,
            ..UiState::default()
        };
        res.reconcile(&[], avatars);
        res
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Re-derives all three maps for a freshly fetched comment set
    ///
    /// Avatars are regenerated for every key. Drafts are emptied unless the policy
    /// says otherwise. Reply box visibility is carried over for roots that are
    /// still there.
    pub fn reconcile(&mut self, comments: &[Comment], avatars: &mut dyn AvatarGenerator) {
        let keys = std::iter::once(ComposeTarget::TopLevel)
            .chain(tree::roots(comments).filter_map(|c| c.id.map(ComposeTarget::Reply)))
            .collect::<Vec<_>>();

        let mut drafts = HashMap::with_capacity(keys.len());
        let mut reply_open = HashMap::with_capacity(keys.len());
        let mut new_avatars = HashMap::with_capacity(keys.len());
        for k in keys {
            let draft = match self.policy.preserve_drafts {
                true => self.drafts.remove(&k).unwrap_or_default(),
                false => String::new(),
            };
            let open = match k {
                ComposeTarget::TopLevel => true,
                ComposeTarget::Reply(_) => self.reply_open.get(&k).copied().unwrap_or(false),
            };
            drafts.insert(k, draft);
            reply_open.insert(k, open);
            new_avatars.insert(k, avatars.generate());
        }
        self.drafts = drafts;
        self.reply_open = reply_open;
        self.avatars = new_avatars;
    }

    pub fn keys(&self) -> BTreeSet<ComposeTarget> {
        self.drafts.keys().copied().collect()
    }

    pub fn draft(&self, target: ComposeTarget) -> &str {
        self.drafts.get(&target).map(|s| s as &str).unwrap_or("")
    }

    /// Returns false, ignoring the text, if `target` is not a known compose box
    pub fn set_draft(&mut self, target: ComposeTarget, text: String) -> bool {
        match self.drafts.get_mut(&target) {
            Some(draft) => {
                *draft = text;
                true
            }
            None => false,
        }
    }

    pub fn avatar(&self, target: ComposeTarget) -> Option<&str> {
        self.avatars.get(&target).map(|s| s as &str)
    }

    pub fn is_open(&self, target: ComposeTarget) -> bool {
        self.reply_open.get(&target).copied().unwrap_or(false)
    }

    /// Returns false if `root` is not a known root comment
    pub fn open_reply(&mut self, root: CommentId) -> bool {
        self.set_reply_open(root, true)
    }

    pub fn close_reply(&mut self, root: CommentId) -> bool {
        self.set_reply_open(root, false)
    }

    fn set_reply_open(&mut self, root: CommentId, open: bool) -> bool {
        match self.reply_open.get_mut(&ComposeTarget::Reply(root)) {
            Some(v) => {
                *v = open;
                true
            }
            None => false,
        }
    }
}
