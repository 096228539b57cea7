use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{
    api::{self, CommentId, Time},
    Error,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    /// `None` while this comment is a draft that the store has not persisted yet
    pub id: Option<CommentId>,

    pub username: String,

    /// Assigned when the draft is built, never regenerated afterwards
    pub avatar: String,

    pub date: Time,

    pub text: String,

    pub upvotes: u32,

    /// `None` for a root comment
    pub parent_id: Option<CommentId>,
}

/// The fields a user actually provides when writing a comment, everything else
/// gets defaulted by `Comment::draft`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentFields {
    pub username: Option<String>,
    pub avatar: String,
    pub date: Option<Time>,
    pub text: String,
    pub upvotes: Option<u32>,
    pub parent_id: Option<CommentId>,
}

impl Comment {
    /// Builds a comment that has not been persisted yet. No validation happens here.
    pub fn draft(fields: CommentFields) -> Comment {
        Comment {
            id: None,
            username: fields
                .username
                .unwrap_or_else(|| String::from(api::DEFAULT_USERNAME)),
            avatar: fields.avatar,
            date: fields.date.unwrap_or_else(Utc::now),
            text: fields.text,
            upvotes: fields.upvotes.unwrap_or(0),
            parent_id: fields.parent_id,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn to_api(&self) -> api::Comment {
        api::Comment {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
            comment_date: api::format_time(&self.date),
            comment_text: self.text.clone(),
            upvotes: self.upvotes,
            parent_comment_id: self.parent_id,
        }
    }

    pub fn relative_date(&self, now: Time) -> String {
        format_relative(self.date, now)
    }
}

impl TryFrom<api::Comment> for Comment {
    type Error = Error;

    fn try_from(c: api::Comment) -> Result<Comment, Error> {
        Ok(Comment {
            date: parse_time(&c.comment_date)?,
            id: c.id,
            username: c.username,
            avatar: c.avatar,
            text: c.comment_text,
            upvotes: c.upvotes,
            parent_id: c.parent_comment_id,
        })
    }
}

/// Parses an ISO-8601 timestamp. Timestamps without an offset are taken as UTC,
/// and bare dates as midnight UTC.
pub fn parse_time(s: &str) -> Result<Time, Error> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&t));
        }
    }
    if let Some(t) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&t));
    }
    Err(Error::Malformed(format!("invalid comment date {s:?}")))
}

/// Renders `t` relative to `now`, in the narrow style: `5 min. ago`, `in 2 days`
///
/// Counts are truncated towards zero, and anything under a second is `0 sec. ago`.
pub fn format_relative(t: Time, now: Time) -> String {
    let diff = t - now;
    let future = diff > chrono::Duration::zero();
    let diff = if future { diff } else { -diff };

    let days = diff.num_days();
    let (count, unit) = if days >= 365 {
        (days / 365, "yr.")
    } else if days >= 91 {
        (days / 91, if days / 91 == 1 { "qtr." } else { "qtrs." })
    } else if days >= 30 {
        (days / 30, "mo.")
    } else if days >= 7 {
        (days / 7, "wk.")
    } else if days >= 1 {
        (days, if days == 1 { "day" } else { "days" })
    } else if diff.num_hours() >= 1 {
        (diff.num_hours(), "hr.")
    } else if diff.num_minutes() >= 1 {
        (diff.num_minutes(), "min.")
    } else if diff.num_seconds() >= 1 {
        (diff.num_seconds(), "sec.")
    } else {
        return String::from("0 sec. ago");
    };

    if future {
        format!("in {count} {unit}")
    } else {
        format!("{count} {unit} ago")
    }
}
