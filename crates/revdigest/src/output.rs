//! Output formatting for digest results

use anyhow::Result;
use revdigest_core::{
    digest_response, grouped_response, natural_list, widget_html, DigestRequest, Group, GroupBy,
    ItemDirectory, UserDirectory,
};

use crate::cli::Format;

pub fn render(
    format: Format,
    groups: &[Group],
    request: &DigestRequest,
    items: &dyn ItemDirectory,
    users: &dyn UserDirectory,
) -> Result<String> {
    let out = match format {
        Format::Text => render_text(groups, items, users),
        Format::Html => widget_html(groups, items, users),
        Format::Json if request.group_by == GroupBy::Item => {
            let changes: Vec<_> = groups.iter().flat_map(|g| g.changes.iter().cloned()).collect();
            let response = digest_response(&changes, request, items, users);
            serde_json::to_string_pretty(&response)? + "\n"
        }
        Format::Json => {
            let response = grouped_response(groups, request, items, users);
            serde_json::to_string_pretty(&response)? + "\n"
        }
    };
    Ok(out)
}

fn render_text(groups: &[Group], items: &dyn ItemDirectory, users: &dyn UserDirectory) -> String {
    if groups.is_empty() {
        return format!("{}\n", revdigest_core::render::EMPTY_MESSAGE);
    }

    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("[{}] {}\n", group.key, group.description));
        for change in &group.changes {
            let title = items
                .resolve_item(change.item_id)
                .map(|item| item.display_title())
                .unwrap_or_else(|| format!("#{}", change.item_id));
            let names: Vec<String> = change
                .authors
                .iter()
                .filter_map(|&id| users.resolve_author(id))
                .collect();
            let lines = change.changed_lines();

            out.push_str(&format!(
                "  - {} ({} line{} changed)",
                title,
                lines,
                if lines == 1 { "" } else { "s" }
            ));
            if !names.is_empty() {
                out.push_str(&format!(" by {}", natural_list(&names)));
            }
            out.push('\n');
        }
    }
    out
}
