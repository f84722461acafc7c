//! Change collection: modified items to diffed change records

use crate::diff::DiffEngine;
use crate::edit::{changed_lines, edit_magnitude, DiffEdit};
use crate::revision::{select_revision_pair, Revision, RevisionWindow};
use crate::store::{ContentStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The changes made to one content item within a timeframe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub item_id: u64,
    /// Baseline revision (may predate the cutoff)
    pub earliest: Revision,
    pub latest: Revision,
    pub edits: Vec<DiffEdit>,
    /// Table rows rendered from `edits`
    pub rendered: String,
    /// Unique author ids, newest contributor first
    pub authors: Vec<u64>,
}

impl Change {
    fn from_window(
        item_id: u64,
        window: &RevisionWindow,
        cutoff: DateTime<Utc>,
        engine: &DiffEngine,
        include_boundary_author: bool,
    ) -> Self {
        let earliest = window.earliest().clone();
        let latest = window.latest().clone();
        let comparison = engine.diff_texts(&earliest.content, &latest.content);

        Self {
            item_id,
            authors: window.authors(cutoff, include_boundary_author),
            earliest,
            latest,
            edits: comparison.edits,
            rendered: comparison.rendered,
        }
    }

    /// Total line-level edit magnitude
    pub fn magnitude(&self) -> usize {
        edit_magnitude(&self.edits)
    }

    /// Lines touched by insertions, deletions and replacements only
    pub fn changed_lines(&self) -> usize {
        changed_lines(&self.edits)
    }

    /// The first listed author, treated as the primary contributor
    pub fn primary_author(&self) -> Option<u64> {
        self.authors.first().copied()
    }
}

/// Options for a collection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    pub leading_context: usize,
    pub trailing_context: usize,
    /// Count the author of the pre-cutoff baseline revision
    pub include_boundary_author: bool,
    pub inline_emphasis: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            leading_context: 1,
            trailing_context: 1,
            include_boundary_author: true,
            inline_emphasis: true,
        }
    }
}

impl CollectOptions {
    fn engine(&self) -> DiffEngine {
        DiffEngine::new()
            .with_context(self.leading_context, self.trailing_context)
            .with_inline(self.inline_emphasis)
    }
}

/// Collect one `Change` per item modified since `cutoff`.
///
/// Items keep the order the store listed them in. Items with fewer than two
/// revisions in the window are skipped, as are items whose revisions cannot be
/// fetched. Only a failure to list modified items fails the whole pass.
pub fn collect_changes(
    store: &dyn ContentStore,
    cutoff: DateTime<Utc>,
    options: &CollectOptions,
) -> Result<Vec<Change>, StoreError> {
    let engine = options.engine();
    let modified = store.list_modified_items(cutoff)?;
    let mut changes = Vec::new();

    for item in &modified {
        let revisions = match store.list_revisions(item.id) {
            Ok(revisions) => revisions,
            Err(err) => {
                warn!(item_id = item.id, error = %err, "skipping item with unavailable revisions");
                continue;
            }
        };

        let Some(window) = select_revision_pair(&revisions, cutoff) else {
            debug!(item_id = item.id, revisions = revisions.len(), "not enough revisions in window");
            continue;
        };

        let change = Change::from_window(
            item.id,
            &window,
            cutoff,
            &engine,
            options.include_boundary_author,
        );
        debug!(
            item_id = item.id,
            earliest = change.earliest.id,
            latest = change.latest.id,
            magnitude = change.magnitude(),
            "collected change"
        );
        changes.push(change);
    }

    Ok(changes)
}
