use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    Json,
};
use forum_api::{Comment, CommentList, NewComment, UpvotesUpdate};
use futures::StreamExt;

use crate::{db::CommentDb, extractors::*, feeds::Feeds, Error};

pub async fn fetch_comments(State(db): State<CommentDb>) -> Json<CommentList> {
    Json(CommentList {
        comments: db.fetch_comments().await,
    })
}

pub async fn create_comment(
    State(db): State<CommentDb>,
    State(feeds): State<Feeds>,
    Json(data): Json<NewComment>,
) -> (StatusCode, Json<Comment>) {
    let comment = db.create_comment(data.comment).await;
    tracing::info!(id = ?comment.id, parent = ?comment.parent_comment_id, "created comment");
    feeds.relay("new comment").await;
    (StatusCode::CREATED, Json(comment))
}

pub async fn set_upvotes(
    CommentPath(id): CommentPath,
    State(db): State<CommentDb>,
    State(feeds): State<Feeds>,
    Json(data): Json<UpvotesUpdate>,
) -> Result<Json<Comment>, Error> {
    let comment = db.set_upvotes(id, data.comment.upvotes).await?;
    tracing::info!(%id, upvotes = comment.upvotes, "updated upvotes");
    feeds.relay("comment upvoted").await;
    Ok(Json(comment))
}

pub async fn live_feed(
    ws: WebSocketUpgrade,
    State(feeds): State<Feeds>,
) -> axum::response::Response {
    ws.on_upgrade(move |sock| {
        let (write, read) = sock.split();
        feeds.add(write, read)
    })
}
