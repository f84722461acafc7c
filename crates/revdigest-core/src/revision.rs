//! Content items, their revisions, and change-window selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A piece of content owned by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    /// Content type, e.g. "page"
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Publication status, e.g. "publish"
    #[serde(default = "default_status")]
    pub status: String,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Link to the item's editor
    #[serde(default)]
    pub edit_url: Option<String>,
}

fn default_kind() -> String {
    "page".to_string()
}

fn default_status() -> String {
    "publish".to_string()
}

impl ContentItem {
    pub fn page(id: u64, modified: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: default_kind(),
            status: default_status(),
            modified,
            title: None,
            url: None,
            edit_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_edit_url(mut self, edit_url: impl Into<String>) -> Self {
        self.edit_url = Some(edit_url.into());
        self
    }

    /// Title for display, falling back to the id
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => format!("#{}", self.id),
        }
    }
}

/// An immutable snapshot of a content item's body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: u64,
    pub item_id: u64,
    pub modified: DateTime<Utc>,
    pub author: u64,
    pub content: String,
}

impl Revision {
    pub fn new(
        id: u64,
        item_id: u64,
        modified: DateTime<Utc>,
        author: u64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            item_id,
            modified,
            author,
            content: content.into(),
        }
    }
}

/// The revisions bounding one item's change window.
///
/// Only built by [`select_revision_pair`], so it always holds at least two
/// revisions.
#[derive(Debug, Clone)]
pub struct RevisionWindow {
    collected: Vec<Revision>,
}

impl RevisionWindow {
    /// Every collected revision, newest first. The last one may predate the cutoff.
    pub fn collected(&self) -> &[Revision] {
        &self.collected
    }

    /// Newest revision in the window
    pub fn latest(&self) -> &Revision {
        &self.collected[0]
    }

    /// Oldest revision in the window, used as the diff baseline
    pub fn earliest(&self) -> &Revision {
        &self.collected[self.collected.len() - 1]
    }

    /// Whether the baseline revision was made before `cutoff`
    pub fn has_boundary(&self, cutoff: DateTime<Utc>) -> bool {
        self.earliest().modified < cutoff
    }

    /// Unique author ids across the window, in newest-first order of appearance.
    ///
    /// With `include_boundary` unset, the author of a pre-cutoff baseline
    /// revision counts only if they also made a revision inside the window.
    pub fn authors(&self, cutoff: DateTime<Utc>, include_boundary: bool) -> Vec<u64> {
        let take = if !include_boundary && self.has_boundary(cutoff) {
            self.collected.len() - 1
        } else {
            self.collected.len()
        };

        let mut authors: Vec<u64> = Vec::new();
        for revision in &self.collected[..take] {
            if !authors.contains(&revision.author) {
                authors.push(revision.author);
            }
        }
        authors
    }
}

/// Select the revisions that bound the change window for `cutoff`.
///
/// `revisions` must be ordered newest first. Revisions are collected until
/// one strictly older than `cutoff` has been taken, so the window carries
/// exactly one pre-cutoff revision as its baseline when one exists. Returns
/// `None` when fewer than two revisions were collected.
pub fn select_revision_pair(revisions: &[Revision], cutoff: DateTime<Utc>) -> Option<RevisionWindow> {
    let mut collected = Vec::new();
    for revision in revisions {
        collected.push(revision.clone());
        if revision.modified < cutoff {
            break;
        }
    }

    if collected.len() < 2 {
        return None;
    }

    Some(RevisionWindow { collected })
}
