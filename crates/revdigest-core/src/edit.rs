//! Edit script representation for line diffs

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The kind of edit in a line diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Lines present on both sides
    Unchanged,
    /// Lines only present on the right (latest) side
    Inserted,
    /// Lines only present on the left (earliest) side
    Deleted,
    /// A run of left lines replaced by a run of right lines
    Changed,
}

/// A tagged span over the left and right line sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEdit {
    pub kind: EditKind,
    /// Line range in the left sequence (empty for inserts)
    pub old: Range<usize>,
    /// Line range in the right sequence (empty for deletes)
    pub new: Range<usize>,
    /// Text of the left lines covered by `old`
    pub old_lines: Vec<String>,
    /// Text of the right lines covered by `new`
    pub new_lines: Vec<String>,
}

impl DiffEdit {
    pub fn new(kind: EditKind, old: Range<usize>, new: Range<usize>) -> Self {
        Self {
            kind,
            old,
            new,
            old_lines: Vec::new(),
            new_lines: Vec::new(),
        }
    }

    pub fn unchanged(old: Range<usize>, new: Range<usize>) -> Self {
        Self::new(EditKind::Unchanged, old, new)
    }

    pub fn inserted(at: usize, new: Range<usize>) -> Self {
        Self::new(EditKind::Inserted, at..at, new)
    }

    pub fn deleted(old: Range<usize>, at: usize) -> Self {
        Self::new(EditKind::Deleted, old, at..at)
    }

    pub fn changed(old: Range<usize>, new: Range<usize>) -> Self {
        Self::new(EditKind::Changed, old, new)
    }

    /// Attach the line text of both sides, sliced from the full sequences
    pub fn with_text<S: AsRef<str>>(mut self, left: &[S], right: &[S]) -> Self {
        self.old_lines = left[self.old.clone()]
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        self.new_lines = right[self.new.clone()]
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        self
    }

    /// Check if this is an actual change (not just context)
    pub fn is_change(&self) -> bool {
        self.kind != EditKind::Unchanged
    }

    /// Line-level size of this edit: the longer of its two spans
    pub fn magnitude(&self) -> usize {
        self.old.len().max(self.new.len())
    }
}

/// Total line-level magnitude of a script, context runs included
pub fn edit_magnitude(edits: &[DiffEdit]) -> usize {
    edits.iter().map(DiffEdit::magnitude).sum()
}

/// Number of lines touched by the actual modifications of a script
pub fn changed_lines(edits: &[DiffEdit]) -> usize {
    edits
        .iter()
        .filter(|e| e.is_change())
        .map(DiffEdit::magnitude)
        .sum()
}

/// Check whether an edit script contains any actual modifications
pub fn has_changes(edits: &[DiffEdit]) -> bool {
    edits.iter().any(DiffEdit::is_change)
}

/// Rebuild the right-hand sequence by applying `edits` to `left`
pub fn apply_edits<S: AsRef<str>>(left: &[S], edits: &[DiffEdit]) -> Vec<String> {
    let mut out = Vec::new();
    for edit in edits {
        match edit.kind {
            EditKind::Unchanged => {
                out.extend(left[edit.old.clone()].iter().map(|s| s.as_ref().to_string()))
            }
            EditKind::Deleted => {}
            EditKind::Inserted | EditKind::Changed => out.extend(edit.new_lines.iter().cloned()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_uses_longer_span() {
        let edit = DiffEdit::changed(0..2, 0..5);
        assert_eq!(edit.magnitude(), 5);
        assert_eq!(DiffEdit::deleted(3..6, 1).magnitude(), 3);
    }

    #[test]
    fn test_edit_magnitude_counts_context() {
        let edits = vec![
            DiffEdit::unchanged(0..10, 0..10),
            DiffEdit::inserted(10, 10..12),
            DiffEdit::deleted(10..11, 12),
        ];
        assert_eq!(edit_magnitude(&edits), 13);
        assert_eq!(changed_lines(&edits), 3);
        assert!(has_changes(&edits));
        assert!(!has_changes(&edits[..1]));
    }

    #[test]
    fn test_with_text_slices_both_sides() {
        let left = ["a", "b", "c"];
        let right = ["a", "x", "c"];
        let edit = DiffEdit::changed(1..2, 1..2).with_text(&left, &right);
        assert_eq!(edit.old_lines, vec!["b"]);
        assert_eq!(edit.new_lines, vec!["x"]);
    }
}
