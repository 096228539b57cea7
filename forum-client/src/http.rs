use async_trait::async_trait;

use crate::{
    api::{self, CommentId, CommentList, NewComment, UpvotesUpdate},
    CommentStore, Error,
};

/// `CommentStore` talking to the forum's REST endpoints
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: reqwest::Client,
    host: String,
}

impl HttpStore {
    /// `host` is the base url, eg. `http://localhost:3000`
    pub fn new(host: impl Into<String>) -> HttpStore {
        HttpStore::with_client(reqwest::Client::new(), host)
    }

    pub fn with_client(client: reqwest::Client, host: impl Into<String>) -> HttpStore {
        let mut host = host.into();
        while host.ends_with('/') {
            host.pop();
        }
        HttpStore { client, host }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Turns any non-success response into a protocol error carrying the status and body
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = match resp.text().await {
        Ok(body) => body,
        Err(err) => format!("<failed reading response body: {err}>"),
    };
    Err(Error::Protocol { status, body })
}

#[async_trait]
impl CommentStore for HttpStore {
    async fn fetch_comments(&self) -> Result<Vec<api::Comment>, Error> {
        let resp = self
            .client
            .get(format!("{}/comments", self.host))
            .send()
            .await?;
        let body = check_status(resp).await?.bytes().await?;
        let list: CommentList = serde_json::from_slice(&body)
            .map_err(|err| Error::Malformed(format!("parsing comment list: {err}")))?;
        Ok(list.comments)
    }

    async fn create_comment(&self, comment: api::Comment) -> Result<(), Error> {
        let resp = self
            .client
            .post(format!("{}/comments", self.host))
            .json(&NewComment { comment })
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn set_upvotes(&self, id: CommentId, upvotes: u32) -> Result<(), Error> {
        let resp = self
            .client
            .patch(format!("{}/comments/{}", self.host, id))
            .json(&UpvotesUpdate::new(upvotes))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}
