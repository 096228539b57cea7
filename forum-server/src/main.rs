use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use axum::{
    routing::{get, patch},
    Router,
};
use structopt::StructOpt;
use tower_http::trace::TraceLayer;

mod db;
mod error;
mod extractors;
mod feeds;
mod handlers;

#[cfg(test)]
mod fuzz;

use db::CommentDb;
use error::Error;
use extractors::AppState;
use feeds::Feeds;

#[derive(Debug, StructOpt)]
#[structopt(name = "forum-server", about = "Comment store and live update feed")]
struct Opt {
    /// Address to listen on
    #[structopt(long, env = "FORUM_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// JSON file holding the comments to start with, eg. as written by generate-test-data
    #[structopt(long, env = "FORUM_SEED", parse(from_os_str))]
    seed: Option<PathBuf>,
}

pub fn app(db: CommentDb, feeds: Feeds) -> Router {
    Router::new()
        .route(
            "/comments",
            get(handlers::fetch_comments).post(handlers::create_comment),
        )
        .route("/comments/:id", patch(handlers::set_upvotes))
        .route("/", get(handlers::live_feed))
        .route("/socket", get(handlers::live_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { db, feeds })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    let db = match &opt.seed {
        Some(path) => CommentDb::load_seed(path).await?,
        None => CommentDb::new(),
    };
    let app = app(db, Feeds::new());

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}
