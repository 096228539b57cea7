use chrono::Utc;
use forum_client::{
    api::{self, CommentId},
    feed, ClientConfig, CommentStore, ComposeTarget, FeedSubscription, Forum, HttpStore,
    RandomAvatars,
};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::render;

/// One line typed by the user in the live view
#[derive(Debug, Eq, PartialEq)]
pub enum Input {
    /// Plain text: submitted from the current compose box
    Text(String),
    Reply(CommentId),
    Top,
    Upvote(CommentId),
    Refresh,
    Quit,
    Invalid(String),
}

pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(cmd) = line.strip_prefix('/') else {
        return Some(Input::Text(String::from(line)));
    };
    let mut words = cmd.split_whitespace();
    let id = |arg: Option<&str>| arg.and_then(|a| a.trim_start_matches('#').parse().ok());
    Some(match (words.next(), words.next(), words.next()) {
        (Some("reply"), arg, None) => match id(arg) {
            Some(id) => Input::Reply(CommentId(id)),
            None => Input::Invalid(String::from("usage: /reply <comment id>")),
        },
        (Some("upvote"), arg, None) => match id(arg) {
            Some(id) => Input::Upvote(CommentId(id)),
            None => Input::Invalid(String::from("usage: /upvote <comment id>")),
        },
        (Some("top"), None, None) => Input::Top,
        (Some("refresh"), None, None) => Input::Refresh,
        (Some("quit"), None, None) => Input::Quit,
        _ => Input::Invalid(format!("unknown command {line:?}")),
    })
}

fn draw<S: CommentStore>(forum: &Forum<S>, target: ComposeTarget) {
    // clear screen and move the cursor home
    print!("\x1b[2J\x1b[H{}", render(forum, Utc::now()));
    match target {
        ComposeTarget::TopLevel => println!("new comment> "),
        ComposeTarget::Reply(id) => println!("reply to #{id}> "),
    }
}

/// Handles one line of input, returning false once the user asked to leave
async fn handle_input<S: CommentStore>(
    forum: &mut Forum<S>,
    target: &mut ComposeTarget,
    input: Input,
) -> bool {
    match input {
        Input::Text(text) => {
            if let Err(err) = api::validate_comment_text(&text) {
                eprintln!("{err}");
                return true;
            }
            if !forum.set_draft(*target, text) {
                eprintln!("comment {target:?} is gone, back to a new thread");
                *target = ComposeTarget::TopLevel;
                return true;
            }
            match forum.try_create_comment(*target).await {
                Ok(()) => *target = ComposeTarget::TopLevel,
                Err(err) => eprintln!("failed posting comment: {err}"),
            }
        }
        Input::Reply(id) => match forum.open_reply(id) {
            true => *target = ComposeTarget::Reply(id),
            false => eprintln!("#{id} is not a thread you can reply to"),
        },
        Input::Top => *target = ComposeTarget::TopLevel,
        Input::Upvote(id) => forum.upvote(id).await,
        Input::Refresh => forum.refresh().await,
        Input::Quit => return false,
        Input::Invalid(msg) => eprintln!("{msg}"),
    }
    true
}

/// Live view: renders the forum, re-renders on every live update, and reads
/// comments and commands from stdin until it is closed
pub async fn watch(config: ClientConfig) -> anyhow::Result<()> {
    let mut forum = Forum::with_avatars(
        HttpStore::new(config.host.clone()),
        Box::new(RandomAvatars::new()),
        config.reconcile,
    );
    let (sub, mut notifications) =
        FeedSubscription::connect(config.feed_url()?, config.reconnect_spacing);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut target = ComposeTarget::TopLevel;

    forum.refresh().await;
    draw(&forum, target);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Some(input) = parse_input(&line) {
                    if !handle_input(&mut forum, &mut target, input).await {
                        break;
                    }
                }
            }
            n = notifications.next() => match n {
                Some(n) => feed::on_notification(&mut forum, &n).await,
                None => break,
            },
        }
        draw(&forum, target);
    }

    sub.close().await;
    Ok(())
}
