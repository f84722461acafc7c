//! Natural-language summaries of change groups

use crate::collect::Change;
use crate::digest::Period;
use crate::store::UserDirectory;
use chrono::{DateTime, Utc};

const DAY_SECS: i64 = 24 * 60 * 60;
const WEEK_SECS: i64 = 7 * DAY_SECS;

/// Subject used when none of a change's authors resolve
const UNKNOWN_SUBJECT: &str = "Someone";

/// Join names as an English list: `A`, `A and B`, `A, B, and C`
pub fn natural_list<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Phrase for a total line-level edit magnitude
pub fn size_phrase(magnitude: usize) -> &'static str {
    match magnitude {
        0..=4 => "small changes",
        5..=19 => "several changes",
        20..=49 => "substantial changes",
        _ => "major changes",
    }
}

/// Phrase for how long ago `then` was, seen from `now`
pub fn time_phrase(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then).num_seconds();

    if elapsed < DAY_SECS {
        "today".to_string()
    } else if elapsed < 2 * DAY_SECS {
        "yesterday".to_string()
    } else if elapsed < WEEK_SECS {
        format!("{} days ago", elapsed / DAY_SECS)
    } else {
        let weeks = elapsed / WEEK_SECS;
        format!("{} week{} ago", weeks, if weeks > 1 { "s" } else { "" })
    }
}

fn resolved_names(authors: &[u64], users: &dyn UserDirectory) -> Vec<String> {
    authors
        .iter()
        .filter_map(|&id| users.resolve_author(id))
        .collect()
}

/// Describe a single change, e.g. "Ann and Bo made several changes yesterday"
pub fn describe_change(change: &Change, users: &dyn UserDirectory, now: DateTime<Utc>) -> String {
    let names = resolved_names(&change.authors, users);
    let subject = if names.is_empty() {
        UNKNOWN_SUBJECT.to_string()
    } else {
        natural_list(&names)
    };

    format!(
        "{} made {} {}",
        subject,
        size_phrase(change.magnitude()),
        time_phrase(now, change.latest.modified)
    )
}

/// Describe a group of changes.
///
/// A group of one is described like a single change. Larger groups are
/// summarized by their distinct resolved authors and the request period.
pub fn describe(
    group: &[Change],
    period: Period,
    users: &dyn UserDirectory,
    now: DateTime<Utc>,
) -> String {
    let change = match group {
        [] => return String::new(),
        [change] => change,
        _ => return describe_many(group, period, users),
    };
    describe_change(change, users, now)
}

fn describe_many(group: &[Change], period: Period, users: &dyn UserDirectory) -> String {
    let mut names: Vec<String> = Vec::new();
    for change in group {
        for name in resolved_names(&change.authors, users) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    match names.as_slice() {
        [name] => format!("{} made {} changes {}", name, group.len(), period.phrase()),
        _ => format!(
            "{} authors made {} changes {}",
            names.len(),
            group.len(),
            period.phrase()
        ),
    }
}
