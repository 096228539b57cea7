//! Live update feed: a websocket on which the store pushes a message every time
//! the comment set changes
//!
//! The content of the messages does not matter, every one of them triggers a
//! full re-sync of the forum.

use std::time::Duration;

use futures::{
    channel::{mpsc, oneshot},
    pin_mut, Stream, StreamExt,
};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::{api::FeedMessage, CommentStore, Forum};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
    /// The store pushed a message. `message` is its text, if the payload had the
    /// expected shape.
    Changed { message: Option<String> },

    /// The feed connection was lost then re-established, so updates may have
    /// been missed in-between
    Reconnected,
}

/// Maps one websocket frame to the notification it carries, if any. Control
/// frames carry none.
pub fn notification_for(msg: &Message) -> Option<Notification> {
    let payload = match msg {
        Message::Text(t) => t.as_bytes(),
        Message::Binary(b) => &b[..],
        _ => return None,
    };
    let message = match serde_json::from_slice::<FeedMessage>(payload) {
        Ok(m) => {
            tracing::info!(message = %m.message, "received live update");
            Some(m.message)
        }
        Err(err) => {
            tracing::warn!(?err, "received live update with unexpected payload");
            None
        }
    };
    Some(Notification::Changed { message })
}

/// Handle on a running feed connection. The connection is torn down when the
/// handle is closed or dropped.
pub struct FeedSubscription {
    canceller: Option<oneshot::Receiver<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    /// Starts listening on `url`, reconnecting every `reconnect_spacing` whenever
    /// the connection drops, until the subscription is closed
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(
        url: String,
        reconnect_spacing: Duration,
    ) -> (FeedSubscription, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded();
        let (cancel, canceller) = oneshot::channel();
        let task = tokio::spawn(run_feed(url, reconnect_spacing, sender, cancel));
        let sub = FeedSubscription {
            canceller: Some(canceller),
            task: Some(task),
        };
        (sub, receiver)
    }

    /// Closes the connection and waits until it is actually closed
    pub async fn close(mut self) {
        // dropping the receiver is what signals the feed task to stop
        self.canceller.take();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(?err, "live update feed task did not terminate cleanly");
            }
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_feed(
    url: String,
    reconnect_spacing: Duration,
    notify: mpsc::UnboundedSender<Notification>,
    mut cancel: oneshot::Sender<()>,
) {
    let mut first_attempt = true;
    let mut connected_before = false;
    'reconnect: loop {
        match first_attempt {
            true => first_attempt = false,
            false => {
                tokio::select! {
                    _ = cancel.cancellation() => return,
                    _ = tokio::time::sleep(reconnect_spacing) => (),
                }
            }
        }

        let mut sock = tokio::select! {
            _ = cancel.cancellation() => return,
            res = tokio_tungstenite::connect_async(url.as_str()) => match res {
                Ok((sock, _)) => sock,
                Err(tungstenite::Error::Url(err)) => {
                    // retrying cannot fix the url itself
                    tracing::error!(?err, %url, "invalid live update feed url, giving up");
                    return;
                }
                Err(err) => {
                    tracing::warn!(?err, %url, "failed connecting to live update feed");
                    continue 'reconnect;
                }
            },
        };
        tracing::info!(%url, "connected to live update feed");
        if connected_before && notify.unbounded_send(Notification::Reconnected).is_err() {
            return;
        }
        connected_before = true;

        loop {
            tokio::select! {
                _ = cancel.cancellation() => {
                    if let Err(err) = sock.close(None).await {
                        tracing::debug!(?err, "error while closing live update feed");
                    }
                    tracing::info!("disconnected from live update feed");
                    return;
                }
                msg = sock.next() => match msg {
                    None => {
                        tracing::warn!("lost live update feed connection");
                        continue 'reconnect;
                    }
                    Some(Err(err)) => {
                        tracing::warn!(?err, "lost live update feed connection");
                        continue 'reconnect;
                    }
                    Some(Ok(msg)) => {
                        if let Some(n) = notification_for(&msg) {
                            if notify.unbounded_send(n).is_err() {
                                tracing::debug!("nobody listens to the live update feed anymore");
                                return;
                            }
                        }
                    }
                },
            }
        }
    }
}

/// Re-syncs `forum` in reaction to a notification, whatever it says
pub async fn on_notification<S: CommentStore>(forum: &mut Forum<S>, notification: &Notification) {
    tracing::debug!(?notification, "re-syncing after live update");
    forum.refresh().await;
}

/// Re-syncs `forum` and calls `render` for every notification, until the
/// notification stream ends
pub async fn listen<S, N, F>(forum: &mut Forum<S>, notifications: N, mut render: F)
where
    S: CommentStore,
    N: Stream<Item = Notification>,
    F: FnMut(&Forum<S>),
{
    pin_mut!(notifications);
    while let Some(n) = notifications.next().await {
        on_notification(forum, &n).await;
        render(forum);
    }
}

/// Initial load followed by `listen`
pub async fn mount<S, N, F>(forum: &mut Forum<S>, notifications: N, mut render: F)
where
    S: CommentStore,
    N: Stream<Item = Notification>,
    F: FnMut(&Forum<S>),
{
    forum.refresh().await;
    render(forum);
    listen(forum, notifications, render).await;
}
