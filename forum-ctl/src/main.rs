use anyhow::Context;
use chrono::Utc;
use forum_client::{
    api::{self, CommentId},
    ClientConfig, ComposeTarget, Forum, HttpStore, ReconcilePolicy, SyncState, DEFAULT_HOST,
};
use tracing_subscriber::EnvFilter;

mod render;
mod watch;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the forum server
    #[structopt(short, long, env = "FORUM_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print every thread
    List,

    /// Post a comment
    Post {
        /// Comment text
        text: String,

        /// Root comment to reply to, instead of starting a new thread
        #[structopt(long)]
        reply_to: Option<u64>,
    },

    /// Upvote a comment
    Upvote {
        /// Comment id
        id: u64,
    },

    /// Live view of the forum, refreshed on every change
    Watch {
        /// Keep the text of compose boxes when the forum changes
        #[structopt(long)]
        keep_drafts: bool,
    },
}

async fn load(host: &str) -> anyhow::Result<Forum<HttpStore>> {
    let mut forum = Forum::new(HttpStore::new(host));
    forum.refresh().await;
    if let SyncState::Failed(err) = forum.state() {
        return Err(err.clone()).with_context(|| format!("fetching comments from {host}"));
    }
    Ok(forum)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    match opt.cmd {
        Command::List => {
            let forum = load(&opt.host).await?;
            print!("{}", render::render(&forum, Utc::now()));
        }
        Command::Post { text, reply_to } => {
            api::validate_comment_text(&text).context("validating comment text")?;
            let mut forum = load(&opt.host).await?;
            let target = match reply_to {
                Some(id) => ComposeTarget::Reply(CommentId(id)),
                None => ComposeTarget::TopLevel,
            };
            forum.set_draft(target, text);
            forum
                .try_create_comment(target)
                .await
                .context("posting comment")?;
        }
        Command::Upvote { id } => {
            let mut forum = load(&opt.host).await?;
            forum
                .try_upvote(CommentId(id))
                .await
                .with_context(|| format!("upvoting comment {id}"))?;
        }
        Command::Watch { keep_drafts } => {
            let config = ClientConfig {
                reconcile: ReconcilePolicy {
                    preserve_drafts: keep_drafts,
                },
                ..ClientConfig::new(opt.host)
            };
            watch::watch(config).await?;
        }
    }

    Ok(())
}
