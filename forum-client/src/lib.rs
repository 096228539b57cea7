mod avatar;
pub use avatar::{AvatarGenerator, RandomAvatars, SequentialAvatars};

mod comment;
pub use comment::{format_relative, parse_time, Comment, CommentFields};

mod config;
pub use config::{ClientConfig, DEFAULT_HOST, RECONNECT_SPACING};

mod error;
pub use error::Error;

pub mod feed;
pub use feed::{FeedSubscription, Notification};

mod http;
pub use http::HttpStore;

mod state;
pub use state::{ComposeTarget, ReconcilePolicy, UiState};

mod store;
pub use store::CommentStore;

mod sync;
pub use sync::{Forum, LoadTicket, SyncState};

pub mod tree;
pub use tree::{Thread, ThreadIndex};

pub use reqwest::StatusCode;

pub mod api {
    pub use forum_api::*;
}
