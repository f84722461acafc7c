//! Adapter-facing shapes: JSON responses and dashboard widget HTML

use crate::collect::Change;
use crate::describe::natural_list;
use crate::diff::escape_html;
use crate::digest::{DigestRequest, Group, Period};
use crate::group::GroupBy;
use crate::store::{ItemDirectory, UserDirectory};
use serde::Serialize;

/// Message shown when a period has no content changes
pub const EMPTY_MESSAGE: &str = "There have been no content changes in this period.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRef {
    pub id: u64,
    pub display_name: String,
}

/// One change as exposed to API consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub post_id: u64,
    pub post_title: String,
    pub post_url: Option<String>,
    pub edit_url: Option<String>,
    pub rendered: String,
    /// Resolvable authors only
    pub authors: Vec<AuthorRef>,
}

/// Flat response listing every change in the period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestResponse {
    pub period: Period,
    pub group_by: GroupBy,
    pub changes: Vec<ChangeSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub description: String,
    pub changes: Vec<ChangeSummary>,
}

/// Response keyed by group, each with its description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedResponse {
    pub period: Period,
    pub group_by: GroupBy,
    pub groups: Vec<GroupSummary>,
    pub count: usize,
}

pub fn summarize_change(
    change: &Change,
    items: &dyn ItemDirectory,
    users: &dyn UserDirectory,
) -> ChangeSummary {
    let item = items.resolve_item(change.item_id);
    let authors = change
        .authors
        .iter()
        .filter_map(|&id| {
            users.resolve_author(id).map(|display_name| AuthorRef { id, display_name })
        })
        .collect();

    ChangeSummary {
        post_id: change.item_id,
        post_title: item
            .as_ref()
            .map(|i| i.display_title())
            .unwrap_or_else(|| format!("#{}", change.item_id)),
        post_url: item.as_ref().and_then(|i| i.url.clone()),
        edit_url: item.and_then(|i| i.edit_url),
        rendered: change.rendered.clone(),
        authors,
    }
}

pub fn digest_response(
    changes: &[Change],
    request: &DigestRequest,
    items: &dyn ItemDirectory,
    users: &dyn UserDirectory,
) -> DigestResponse {
    let changes: Vec<ChangeSummary> = changes
        .iter()
        .map(|change| summarize_change(change, items, users))
        .collect();

    DigestResponse {
        period: request.period,
        group_by: request.group_by,
        count: changes.len(),
        changes,
    }
}

pub fn grouped_response(
    groups: &[Group],
    request: &DigestRequest,
    items: &dyn ItemDirectory,
    users: &dyn UserDirectory,
) -> GroupedResponse {
    let groups: Vec<GroupSummary> = groups
        .iter()
        .map(|group| GroupSummary {
            key: group.key.clone(),
            description: group.description.clone(),
            changes: group
                .changes
                .iter()
                .map(|change| summarize_change(change, items, users))
                .collect(),
        })
        .collect();

    GroupedResponse {
        period: request.period,
        group_by: request.group_by,
        count: groups.iter().map(|g| g.changes.len()).sum(),
        groups,
    }
}

/// Render the dashboard widget body for a digest
pub fn widget_html(groups: &[Group], items: &dyn ItemDirectory, users: &dyn UserDirectory) -> String {
    if groups.iter().all(|g| g.changes.is_empty()) {
        return format!("<p class=\"revisions-digest-empty\">{EMPTY_MESSAGE}</p>\n");
    }

    let mut out = String::new();
    for group in groups {
        out.push_str(&format!(
            "<section class=\"revisions-digest-group\" data-key=\"{}\">\n",
            escape_html(&group.key)
        ));
        out.push_str(&format!(
            "<p class=\"revisions-digest-description\">{}</p>\n",
            escape_html(&group.description)
        ));
        for change in &group.changes {
            push_change_block(&mut out, &summarize_change(change, items, users));
        }
        out.push_str("</section>\n");
    }
    out
}

fn push_change_block(out: &mut String, summary: &ChangeSummary) {
    out.push_str("<div class=\"activity-block\">\n");

    let title = escape_html(&summary.post_title);
    out.push_str("<h3>");
    match &summary.post_url {
        Some(url) => out.push_str(&format!("<a href=\"{}\">{}</a>", escape_html(url), title)),
        None => out.push_str(&title),
    }
    if let Some(edit_url) = &summary.edit_url {
        out.push_str(&format!(
            " <a href=\"{}\" class=\"revisions-digest-edit-link\">Edit</a>",
            escape_html(edit_url)
        ));
    }
    out.push_str("</h3>\n");

    let names: Vec<&str> = summary
        .authors
        .iter()
        .map(|a| a.display_name.as_str())
        .collect();
    if !names.is_empty() {
        out.push_str(&format!(
            "<p>Changed by {}</p>\n",
            escape_html(&natural_list(&names))
        ));
    }

    // Rows are escaped by the diff renderer.
    out.push_str("<table class=\"diff\">\n");
    out.push_str(&summary.rendered);
    out.push_str("</table>\n");
    out.push_str("</div>\n");
}
