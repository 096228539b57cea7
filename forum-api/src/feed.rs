/// Payload pushed on the live update channel whenever the comment set changed
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FeedMessage {
    pub message: String,
}

impl FeedMessage {
    pub fn new(message: impl Into<String>) -> FeedMessage {
        FeedMessage {
            message: message.into(),
        }
    }
}
