use std::fmt::Write;

use forum_client::{api::Time, Comment, CommentStore, ComposeTarget, Forum, SyncState, Thread};

fn header(c: &Comment, now: Time) -> String {
    let id = match c.id {
        Some(id) => format!("#{id}"),
        None => String::from("#?"),
    };
    format!(
        "{id} {} · {} · {} upvotes",
        c.username,
        c.relative_date(now),
        c.upvotes
    )
}

/// Connector drawn next to a root comment: a branch when replies hang below it,
/// a plain dash otherwise
pub fn connector(thread: &Thread<'_>) -> &'static str {
    match thread.has_replies() {
        true => "┬",
        false => "─",
    }
}

/// Renders the whole forum as plain text, newest threads first
pub fn render<S: CommentStore>(forum: &Forum<S>, now: Time) -> String {
    let mut out = String::new();
    match forum.state() {
        SyncState::Idle | SyncState::Loading => {
            out.push_str("Loading...\n");
            return out;
        }
        SyncState::Failed(err) => {
            // writing to a String never fails
            let _ = writeln!(out, "Error: {err}");
            return out;
        }
        SyncState::Loaded => (),
    }

    let threads = forum.threads();
    if threads.is_empty() {
        out.push_str("No comments yet\n");
    }
    for thread in threads {
        let _ = writeln!(out, "{} {}", connector(&thread), header(thread.root, now));
        let _ = writeln!(out, "  {}", thread.root.text);
        let last = thread.replies.len().saturating_sub(1);
        for (i, reply) in thread.replies.iter().enumerate() {
            let (branch, rail) = match i == last {
                true => ("└", " "),
                false => ("├", "│"),
            };
            let _ = writeln!(out, "{branch} {}", header(reply, now));
            let _ = writeln!(out, "{rail}   {}", reply.text);
        }
        if let Some(id) = thread.root.id {
            let target = ComposeTarget::Reply(id);
            if forum.ui().is_open(target) {
                let _ = writeln!(out, "  ↳ replying to #{id}: {}", forum.ui().draft(target));
            }
        }
        out.push('\n');
    }
    out
}
