use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use forum_client::{
    api::{self, CommentId, Error, FeedMessage},
    CommentStore, StatusCode,
};
use futures::channel::mpsc;
use tokio::sync::Mutex;

/// In-memory comment store with a push channel, behaving like the real server
pub struct MockServer {
    comments: Vec<api::Comment>,
    next_id: u64,
    feeds: Vec<mpsc::UnboundedSender<FeedMessage>>,
    failures: VecDeque<Error>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            comments: Vec::new(),
            next_id: 1,
            feeds: Vec::new(),
            failures: VecDeque::new(),
        }
    }

    /// Starts with `comments` already stored. Comments without an id get one.
    pub fn with_comments(comments: Vec<api::Comment>) -> MockServer {
        let mut res = MockServer::new();
        res.next_id = comments
            .iter()
            .filter_map(|c| c.id)
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1);
        for mut c in comments {
            if c.id.is_none() {
                c.id = Some(res.allocate_id());
            }
            res.comments.push(c);
        }
        res
    }

    fn allocate_id(&mut self) -> CommentId {
        let id = CommentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn relay(&mut self, msg: &str) {
        self.feeds
            .retain(|f| f.unbounded_send(FeedMessage::new(msg)).is_ok());
    }

    fn check_failure(&mut self) -> Result<(), Error> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Makes the next store call fail with `err`
    pub fn test_fail_next(&mut self, err: Error) {
        self.failures.push_back(err);
    }

    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    /// Number of push subscribers still listening
    pub fn test_num_feeds(&self) -> usize {
        self.feeds.iter().filter(|f| !f.is_closed()).count()
    }

    pub fn fetch_comments(&mut self) -> Result<Vec<api::Comment>, Error> {
        self.check_failure()?;
        Ok(self.comments.clone())
    }

    /// Stores `comment` with a fresh id and the current time, and returns it as stored
    pub fn create_comment(&mut self, comment: api::Comment) -> Result<api::Comment, Error> {
        self.check_failure()?;
        let comment = api::Comment {
            id: Some(self.allocate_id()),
            comment_date: api::format_time(&chrono::Utc::now()),
            ..comment
        };
        self.comments.push(comment.clone());
        self.relay("new comment");
        Ok(comment)
    }

    pub fn set_upvotes(&mut self, id: CommentId, upvotes: u32) -> Result<(), Error> {
        self.check_failure()?;
        let c = self
            .comments
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or(Error::CommentNotFound(id))?;
        c.upvotes = upvotes;
        self.relay("comment upvoted");
        Ok(())
    }

    pub fn action_feed(&mut self) -> mpsc::UnboundedReceiver<FeedMessage> {
        let (sender, receiver) = mpsc::unbounded();
        self.feeds.push(sender);
        receiver
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// `MockServer` shared between a test and the forum under test
#[derive(Clone)]
pub struct SharedMockServer(pub Arc<Mutex<MockServer>>);

impl SharedMockServer {
    pub fn new(server: MockServer) -> SharedMockServer {
        SharedMockServer(Arc::new(Mutex::new(server)))
    }
}

/// Renders an API error the way the HTTP client would have seen it
fn protocol_error(err: Error) -> forum_client::Error {
    forum_client::Error::Protocol {
        status: StatusCode::from_u16(err.status_code().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body: String::from_utf8_lossy(&err.contents()).into_owned(),
    }
}

#[async_trait]
impl CommentStore for SharedMockServer {
    async fn fetch_comments(&self) -> Result<Vec<api::Comment>, forum_client::Error> {
        self.0.lock().await.fetch_comments().map_err(protocol_error)
    }

    async fn create_comment(&self, comment: api::Comment) -> Result<(), forum_client::Error> {
        self.0
            .lock()
            .await
            .create_comment(comment)
            .map(|_| ())
            .map_err(protocol_error)
    }

    async fn set_upvotes(&self, id: CommentId, upvotes: u32) -> Result<(), forum_client::Error> {
        self.0
            .lock()
            .await
            .set_upvotes(id, upvotes)
            .map_err(protocol_error)
    }
}
