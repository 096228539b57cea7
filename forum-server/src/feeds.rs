use std::{collections::HashMap, sync::Arc};

use axum::extract::ws::Message;
use forum_api::FeedMessage;
use futures::{channel::mpsc, select, SinkExt, StreamExt};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Every open live update socket, keyed by a per-connection id
#[derive(Clone, Debug)]
pub struct Feeds(Arc<RwLock<HashMap<Uuid, mpsc::UnboundedSender<FeedMessage>>>>);

impl Feeds {
    pub fn new() -> Feeds {
        Feeds(Arc::new(RwLock::new(HashMap::new())))
    }

    pub async fn num_sockets(&self) -> usize {
        self.0.read().await.len()
    }

    pub async fn add<W, R>(self, mut write: W, read: R)
    where
        W: 'static + Send + Unpin + futures::Sink<Message>,
        <W as futures::Sink<Message>>::Error: Send,
        R: 'static + Send + Unpin + futures::Stream<Item = Result<Message, axum::Error>>,
    {
        // Unbounded so that relaying never waits on a slow socket while holding the read-lock
        let (sender, mut receiver) = mpsc::unbounded();
        let sender_id = Uuid::new_v4();
        self.0.write().await.insert(sender_id, sender);
        tracing::debug!(%sender_id, "live update socket connected");

        let this = self.clone();
        let mut read = read.fuse();
        tokio::spawn(async move {
            macro_rules! remove_self {
                () => {{
                    this.0.write().await.remove(&sender_id);
                    tracing::debug!(%sender_id, "live update socket disconnected");
                    return;
                }};
            }
            loop {
                select! {
                    msg = receiver.next() => match msg {
                        None => remove_self!(),
                        Some(msg) => {
                            let json = match serde_json::to_string(&msg) {
                                Ok(json) => json,
                                Err(err) => {
                                    tracing::error!(?err, ?msg, "failed serializing message to json");
                                    continue;
                                }
                            };
                            if write.send(Message::Text(json)).await.is_err() {
                                remove_self!();
                            }
                        }
                    },
                    msg = read.next() => match msg {
                        None => remove_self!(),
                        Some(Ok(Message::Close(_))) => remove_self!(),
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => (),
                        Some(Ok(msg)) => {
                            tracing::debug!(?msg, "ignoring message sent by live update client");
                        }
                        Some(Err(err)) => {
                            tracing::debug!(?err, "live update socket failed");
                            remove_self!();
                        }
                    },
                }
            }
        });
    }

    /// Pushes `message` to every open socket
    pub async fn relay(&self, message: &str) {
        let msg = FeedMessage::new(message);
        tracing::debug!(?msg, "relaying live update");
        for s in self.0.read().await.values() {
            let _ = s.unbounded_send(msg.clone());
        }
    }
}

impl Default for Feeds {
    fn default() -> Feeds {
        Feeds::new()
    }
}
