#![cfg(test)]

use std::{cmp, fmt::Debug, ops::RangeTo, panic::AssertUnwindSafe, time::Duration};

use axum::{
    extract::FromRequestParts,
    http::{self, request},
};
use forum_api::{Comment, CommentId, CommentList, Error as ApiError, NewComment, UpvotesUpdate};
use forum_client::{
    feed, ClientConfig, ComposeTarget, FeedSubscription, Forum, HttpStore, Notification,
    ReconcilePolicy, SequentialAvatars, SyncState,
};
use forum_mock_server::MockServer;
use futures::StreamExt;
use tower::{Service, ServiceExt};

use crate::{extractors::*, *};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

do_tokio_test!(fuzz_comment_path_extractor, String, |id: String| async move {
    let mut router = comment_path_router();
    let uri = format!("/comments/{id}");
    if let Ok(req) = http::Request::builder()
        .method(http::Method::GET)
        .uri(&uri)
        .body(axum::body::Body::empty())
    {
        let resp = router
            .ready()
            .await
            .expect("waiting for router to be ready")
            .call(req)
            .await
            .expect("running request");
        match resp.status() {
            http::StatusCode::OK | http::StatusCode::BAD_REQUEST | http::StatusCode::NOT_FOUND => (),
            s => panic!("got unexpected status {s} for uri {uri:?}"),
        }
    }
});

fn comment_path_router() -> Router {
    Router::new().route(
        "/comments/:id",
        axum::routing::get(|CommentPath(id): CommentPath| async move { id.to_string() }),
    )
}

#[tokio::test]
async fn comment_path_rejects_non_numeric_ids() {
    let req = http::Request::builder()
        .uri("/comments/abc")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = comment_path_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    assert_eq!(
        ApiError::parse(&body).unwrap(),
        ApiError::InvalidCommentId(String::from("abc"))
    );

    // path parameters only exist once a router matched the request
    let mut parts = http::Request::builder()
        .uri("/comments/12")
        .body(())
        .unwrap()
        .into_parts()
        .0;
    assert!(CommentPath::from_request_parts(&mut parts, &()).await.is_err());
}

async fn call<Req, Resp>(
    app: &mut Router,
    req: request::Request<axum::body::Body>,
    req_body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status.is_success() {
        return Ok(serde_json::from_slice(&body).unwrap_or_else(|err| {
            panic!(
                r#"
                    Failed parsing resp body!

                    The error is the following:
                    ---
                    {err}
                    ---

                    Response body is:
                    ---
                    {body:?}
                    ---

                    Request was:
                    ---
                    {req_body:?}
                    ---
                "#
            )
        }));
    }
    Err(ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}")))
}

async fn run_on_app<Req, Resp>(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: Option<&Req>,
) -> Result<Resp, ApiError>
where
    Req: Debug + serde::Serialize,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    let req = request::Builder::new()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    let req = match body {
        Some(body) => req.body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serializing request body to json"),
        )),
        None => req.body(axum::body::Body::empty()),
    }
    .expect("building request");
    call(app, req, &body).await
}

/// The store picks the timestamp of new comments, so two stores never agree on it
fn without_dates(mut comments: Vec<Comment>) -> Vec<Comment> {
    for c in comments.iter_mut() {
        c.comment_date = String::new();
    }
    comments
}

fn compare<T>(name: &str, app_res: Result<T, ApiError>, mock_res: Result<T, ApiError>)
where
    T: Debug + PartialEq,
{
    assert_eq!(
        app_res, mock_res,
        "app and mock did not return the same result for {name}"
    );
}

fn resize_int(fuzz_id: usize, RangeTo { end }: RangeTo<usize>) -> Option<usize> {
    if end == 0 {
        return None;
    }
    let bucket_size = cmp::max(1, usize::MAX / end); // in case we rounded to 0
    let id = fuzz_id / bucket_size;
    Some(cmp::min(id, end - 1)) // in case id was actually over end - 1 due to rounding
}

#[derive(Debug)]
enum FuzzOp {
    Fetch,
    Create { parent: Option<usize>, text: String },
    Upvote { id: usize, upvotes: u32 },
    UpvoteMissing { id: u64 },
}

impl FuzzOp {
    fn from_raw((kind, a, b): (u8, usize, u32)) -> FuzzOp {
        match kind % 4 {
            0 => FuzzOp::Fetch,
            1 => FuzzOp::Create {
                parent: (b % 2 == 0).then_some(a),
                text: format!("comment number {b}"),
            },
            2 => FuzzOp::Upvote { id: a, upvotes: b },
            _ => FuzzOp::UpvoteMissing {
                id: u64::from(b) + 1_000_000,
            },
        }
    }
}

struct ComparativeFuzzer {
    app: Router,
    mock: MockServer,
}

impl ComparativeFuzzer {
    fn new() -> ComparativeFuzzer {
        ComparativeFuzzer {
            app: app(CommentDb::new(), Feeds::new()),
            mock: MockServer::new(),
        }
    }

    fn pick_comment(&self, fuzz_id: usize) -> Option<CommentId> {
        let idx = resize_int(fuzz_id, ..self.mock.test_num_comments())?;
        // both stores number comments from 1 in creation order
        Some(CommentId(idx as u64 + 1))
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::Fetch => compare(
                "Fetch",
                run_on_app::<(), CommentList>(&mut self.app, "GET", "/comments", None)
                    .await
                    .map(|l| without_dates(l.comments)),
                self.mock.fetch_comments().map(without_dates),
            ),
            FuzzOp::Create { parent, text } => {
                let comment = Comment {
                    id: None,
                    username: String::from("fuzzer"),
                    avatar: String::from("https://example.org/avatar.svg"),
                    comment_date: String::from("2024-01-01T00:00:00.000Z"),
                    comment_text: text,
                    upvotes: 0,
                    parent_comment_id: parent.and_then(|p| self.pick_comment(p)),
                };
                compare(
                    "Create",
                    run_on_app::<_, Comment>(
                        &mut self.app,
                        "POST",
                        "/comments",
                        Some(&NewComment {
                            comment: comment.clone(),
                        }),
                    )
                    .await
                    .map(|c| without_dates(vec![c])),
                    self.mock.create_comment(comment).map(|c| without_dates(vec![c])),
                )
            }
            FuzzOp::Upvote { id, upvotes } => {
                if let Some(id) = self.pick_comment(id) {
                    compare(
                        "Upvote",
                        run_on_app::<_, Comment>(
                            &mut self.app,
                            "PATCH",
                            &format!("/comments/{id}"),
                            Some(&UpvotesUpdate::new(upvotes)),
                        )
                        .await
                        .map(|_| ()),
                        self.mock.set_upvotes(id, upvotes),
                    )
                }
            }
            FuzzOp::UpvoteMissing { id } => compare(
                "UpvoteMissing",
                run_on_app::<_, Comment>(
                    &mut self.app,
                    "PATCH",
                    &format!("/comments/{id}"),
                    Some(&UpvotesUpdate::new(1)),
                )
                .await
                .map(|_| ()),
                self.mock.set_upvotes(CommentId(id), 1),
            ),
        }
    }
}

do_tokio_test!(
    compare_with_mock,
    Vec<(u8, usize, u32)>,
    |test: Vec<(u8, usize, u32)>| async move {
        let mut fuzzer = ComparativeFuzzer::new();
        for op in test {
            fuzzer.execute_fuzz_op(FuzzOp::from_raw(op)).await;
        }
        fuzzer.execute_fuzz_op(FuzzOp::Fetch).await;
    }
);

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn client_sees_writes_of_other_clients() {
    let feeds = Feeds::new();
    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
        .serve(app(CommentDb::new(), feeds.clone()).into_make_service());
    let config = ClientConfig::new(format!("http://{}", server.local_addr()));
    tokio::spawn(server);

    let (sub, mut notifications) =
        FeedSubscription::connect(config.feed_url().unwrap(), Duration::from_millis(10));
    tokio::time::timeout(TIMEOUT, async {
        while feeds.num_sockets().await == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("feed never connected");

    let mut viewer = Forum::with_avatars(
        HttpStore::new(config.host.clone()),
        Box::new(SequentialAvatars::new()),
        ReconcilePolicy::default(),
    );
    viewer.refresh().await;
    assert_eq!(*viewer.state(), SyncState::Loaded);
    assert!(viewer.comments().is_empty());

    let mut writer = Forum::new(HttpStore::new(config.host.clone()));
    writer.refresh().await;
    writer.set_draft(ComposeTarget::TopLevel, String::from("first comment ever"));
    writer
        .try_create_comment(ComposeTarget::TopLevel)
        .await
        .unwrap();

    let n = tokio::time::timeout(TIMEOUT, notifications.next())
        .await
        .expect("no live update received");
    assert_eq!(
        n,
        Some(Notification::Changed {
            message: Some(String::from("new comment"))
        })
    );
    feed::on_notification(&mut viewer, &Notification::Reconnected).await;
    let comments = viewer.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, Some(CommentId(1)));
    assert_eq!(comments[0].text, "first comment ever");
    assert_eq!(comments[0].username, forum_api::DEFAULT_USERNAME);

    writer.try_upvote(CommentId(1)).await.unwrap();
    tokio::time::timeout(TIMEOUT, notifications.next())
        .await
        .expect("no live update received");
    feed::on_notification(&mut viewer, &Notification::Reconnected).await;
    assert_eq!(viewer.comments()[0].upvotes, 1);

    let missing = writer.try_upvote(CommentId(42)).await;
    assert_eq!(missing, Err(forum_client::Error::UnknownComment(CommentId(42))));

    tokio::time::timeout(TIMEOUT, sub.close()).await.unwrap();
}
