//! Line diff computation and HTML table rendering

use crate::edit::{DiffEdit, EditKind};
use regex::Regex;
use similar::{Algorithm, DiffTag, TextDiff};
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Normalize stored content before line splitting.
///
/// Applied in order:
/// 1. `\r\n` and lone `\r` become `\n`
/// 2. runs of spaces and tabs collapse to a single space
/// 3. trailing whitespace is trimmed from every line
/// 4. runs of blank lines collapse to a single blank line
/// 5. leading and trailing whitespace of the whole text is trimmed
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = false;

    for line in unified.split('\n') {
        let collapsed = SPACE_RUN.replace_all(line, " ");
        let line = collapsed.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        lines.push(line.to_string());
    }

    lines.join("\n").trim().to_string()
}

/// Split normalized text into lines. Empty text has no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(str::to_string).collect()
}

/// Compute a Myers edit script turning `left` into `right`.
///
/// Adjacent deletions and insertions are fused into a single `Changed` edit,
/// so the script alternates between unchanged runs and change runs.
pub fn compute_diff<S: AsRef<str>>(left: &[S], right: &[S]) -> Vec<DiffEdit> {
    let old: Vec<&str> = left.iter().map(AsRef::as_ref).collect();
    let new: Vec<&str> = right.iter().map(AsRef::as_ref).collect();
    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&old, &new);

    let mut edits: Vec<DiffEdit> = Vec::new();
    for op in text_diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if old_range.is_empty() && new_range.is_empty() {
            continue;
        }
        let edit = match tag {
            DiffTag::Equal => DiffEdit::unchanged(old_range, new_range),
            DiffTag::Delete => DiffEdit::deleted(old_range, new_range.start),
            DiffTag::Insert => DiffEdit::inserted(old_range.start, new_range),
            DiffTag::Replace => DiffEdit::changed(old_range, new_range),
        };
        push_edit(&mut edits, edit);
    }

    edits
        .into_iter()
        .map(|edit| edit.with_text(&old, &new))
        .collect()
}

fn push_edit(edits: &mut Vec<DiffEdit>, edit: DiffEdit) {
    if let Some(last) = edits.last_mut() {
        let contiguous = last.old.end == edit.old.start && last.new.end == edit.new.start;
        if contiguous && last.is_change() && edit.is_change() {
            if last.kind != edit.kind {
                last.kind = EditKind::Changed;
            }
            last.old = last.old.start..edit.old.end;
            last.new = last.new.start..edit.new.end;
            return;
        }
        if contiguous && last.kind == EditKind::Unchanged && edit.kind == EditKind::Unchanged {
            last.old = last.old.start..edit.old.end;
            last.new = last.new.start..edit.new.end;
            return;
        }
    }
    edits.push(edit);
}

/// Render an edit script with the given unchanged context around each hunk
pub fn render_diff(edits: &[DiffEdit], leading_context: usize, trailing_context: usize) -> String {
    DiffEngine::new()
        .with_context(leading_context, trailing_context)
        .render(edits)
}

/// Result of comparing two revision bodies
#[derive(Debug, Clone)]
pub struct TextComparison {
    pub edits: Vec<DiffEdit>,
    pub rendered: String,
}

/// The diff engine: normalization, edit script and table rendering
#[derive(Debug, Clone)]
pub struct DiffEngine {
    /// Unchanged lines shown before each hunk
    leading_context: usize,
    /// Unchanged lines shown after each hunk
    trailing_context: usize,
    /// Whether to emphasize changed words within changed line pairs
    inline: bool,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            leading_context: 1,
            trailing_context: 1,
            inline: true,
        }
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, leading: usize, trailing: usize) -> Self {
        self.leading_context = leading;
        self.trailing_context = trailing;
        self
    }

    pub fn with_inline(mut self, enabled: bool) -> Self {
        self.inline = enabled;
        self
    }

    /// Normalize, split, diff and render two bodies of text
    pub fn diff_texts(&self, old: &str, new: &str) -> TextComparison {
        let left = split_lines(&normalize(old));
        let right = split_lines(&normalize(new));
        let edits = compute_diff(&left, &right);
        let rendered = self.render(&edits);
        TextComparison { edits, rendered }
    }

    /// Render table rows for every hunk plus its context window.
    ///
    /// Unchanged runs outside the context windows are omitted. The output is
    /// a sequence of `<tr>` rows meant to be wrapped in a `<table class="diff">`.
    pub fn render(&self, edits: &[DiffEdit]) -> String {
        let mut out = String::new();

        for (i, edit) in edits.iter().enumerate() {
            match edit.kind {
                EditKind::Unchanged => {
                    let lines = &edit.old_lines;
                    // A context run borders the previous hunk at its head and
                    // the next hunk at its tail.
                    let head = if i > 0 { self.trailing_context } else { 0 };
                    let tail = if i + 1 < edits.len() {
                        self.leading_context
                    } else {
                        0
                    };
                    let shown: Vec<&String> = if head + tail >= lines.len() {
                        lines.iter().collect()
                    } else {
                        lines[..head]
                            .iter()
                            .chain(&lines[lines.len() - tail..])
                            .collect()
                    };
                    for line in shown {
                        push_row(&mut out, "diff-context", &escape_html(line));
                    }
                }
                EditKind::Deleted => {
                    for line in &edit.old_lines {
                        push_row(&mut out, "diff-deletedline", &escape_html(line));
                    }
                }
                EditKind::Inserted => {
                    for line in &edit.new_lines {
                        push_row(&mut out, "diff-addedline", &escape_html(line));
                    }
                }
                EditKind::Changed => self.render_changed(&mut out, edit),
            }
        }

        out
    }

    /// Changed runs pair their lines front to front. Lines past the shorter
    /// side are emitted plain.
    fn render_changed(&self, out: &mut String, edit: &DiffEdit) {
        let paired = if self.inline {
            edit.old_lines.len().min(edit.new_lines.len())
        } else {
            0
        };

        for (old, new) in edit.old_lines.iter().zip(edit.new_lines.iter()).take(paired) {
            let (old_html, new_html) =
                inline_pair(old, new).unwrap_or_else(|| (escape_html(old), escape_html(new)));
            push_row(out, "diff-deletedline", &old_html);
            push_row(out, "diff-addedline", &new_html);
        }
        for line in &edit.old_lines[paired..] {
            push_row(out, "diff-deletedline", &escape_html(line));
        }
        for line in &edit.new_lines[paired..] {
            push_row(out, "diff-addedline", &escape_html(line));
        }
    }
}

fn push_row(out: &mut String, class: &str, html: &str) {
    out.push_str("<tr><td class=\"");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(html);
    out.push_str("</td></tr>\n");
}

/// Word-level emphasis for a changed line pair.
///
/// Returns `None` when the two lines share no word, in which case the pair is
/// rendered as plain deleted and added lines.
fn inline_pair(old: &str, new: &str) -> Option<(String, String)> {
    let old_tokens: Vec<&str> = old.split_word_bounds().collect();
    let new_tokens: Vec<&str> = new.split_word_bounds().collect();
    let word_diff = TextDiff::from_slices(&old_tokens, &new_tokens);

    let shares_word = word_diff.ops().iter().any(|op| {
        let (tag, old_range, _) = op.as_tag_tuple();
        tag == DiffTag::Equal && old_tokens[old_range].iter().any(|t| !t.trim().is_empty())
    });
    if !shares_word {
        return None;
    }

    let mut left = String::new();
    let mut right = String::new();
    for op in word_diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let old_text = old_tokens[old_range].concat();
        let new_text = new_tokens[new_range].concat();
        match tag {
            DiffTag::Equal => {
                left.push_str(&escape_html(&old_text));
                right.push_str(&escape_html(&new_text));
            }
            DiffTag::Delete => wrap(&mut left, "del", &old_text),
            DiffTag::Insert => wrap(&mut right, "ins", &new_text),
            DiffTag::Replace => {
                wrap(&mut left, "del", &old_text);
                wrap(&mut right, "ins", &new_text);
            }
        }
    }
    Some((left, right))
}

fn wrap(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_html(text));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{apply_edits, has_changes};
    use proptest::prelude::*;

    fn lines(text: &str) -> Vec<String> {
        split_lines(text)
    }

    #[test]
    fn test_simple_diff() {
        let edits = compute_diff(&lines("foo\nbar\nbaz"), &lines("foo\nqux\nbaz"));

        assert_eq!(edits.len(), 3);
        assert_eq!(edits[1].kind, EditKind::Changed);
        assert_eq!(edits[1].old_lines, vec!["bar"]);
        assert_eq!(edits[1].new_lines, vec!["qux"]);
    }

    #[test]
    fn test_no_changes() {
        let text = lines("foo\nbar\nbaz");
        let edits = compute_diff(&text, &text);

        assert!(!has_changes(&edits));
    }

    #[test]
    fn test_empty_inputs() {
        let empty: Vec<String> = Vec::new();
        assert!(compute_diff(&empty, &empty).is_empty());
        assert_eq!(render_diff(&[], 1, 1), "");
    }

    #[test]
    fn test_pure_insert_and_delete() {
        let empty: Vec<String> = Vec::new();
        let edits = compute_diff(&empty, &lines("a\nb"));
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].kind, EditKind::Inserted);
        assert_eq!(edits[0].new, 0..2);

        let edits = compute_diff(&lines("a\nb"), &empty);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].kind, EditKind::Deleted);
        assert_eq!(edits[0].old, 0..2);
    }

    #[test]
    fn test_applying_edits_reproduces_right() {
        let cases = [
            ("", ""),
            ("", "one\ntwo"),
            ("one\ntwo", ""),
            ("a\nb\nc", "a\nb\nc"),
            ("a\nb\nc\nd", "a\nc\nd\ne"),
            ("x\ny", "y\nx"),
            ("intro\nbody\nbody\noutro", "intro\nnew body\noutro\nappendix"),
        ];

        for (old, new) in cases {
            let left = lines(old);
            let right = lines(new);
            let edits = compute_diff(&left, &right);
            assert_eq!(apply_edits(&left, &edits), right, "{old:?} -> {new:?}");
        }
    }

    proptest! {
        #[test]
        fn test_applying_edits_reproduces_any_right(
            left in prop::collection::vec("[a-d]{0,2}", 0..12),
            right in prop::collection::vec("[a-d]{0,2}", 0..12),
        ) {
            let edits = compute_diff(&left, &right);
            prop_assert_eq!(apply_edits(&left, &edits), right);
            for pair in edits.windows(2) {
                prop_assert_ne!(pair[0].is_change(), pair[1].is_change());
            }
        }
    }

    #[test]
    fn test_edits_alternate_between_context_and_changes() {
        let edits = compute_diff(&lines("a\nb\nc\nd"), &lines("a\nX\nY\nd"));
        for pair in edits.windows(2) {
            assert_ne!(pair[0].is_change(), pair[1].is_change());
        }
    }

    #[test]
    fn test_normalize_whitespace() {
        let text = "  Title\t\there \r\n\r\n\r\n\nBody  text   \rEnd\n\n";
        assert_eq!(normalize(text), "Title here\n\nBody text\nEnd");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("a  b\n\n\n c \n");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_render_limits_context() {
        let left = lines("a\nb\nc\nd\ne\nf\ng");
        let right = lines("a\nb\nc\nX\ne\nf\ng");
        let rendered = render_diff(&compute_diff(&left, &right), 1, 1);

        assert!(rendered.contains("<td class=\"diff-context\">c</td>"));
        assert!(rendered.contains("<td class=\"diff-context\">e</td>"));
        assert!(!rendered.contains(">b<"));
        assert!(!rendered.contains(">f<"));
        assert!(rendered.contains("<td class=\"diff-deletedline\">d</td>"));
        assert!(rendered.contains("<td class=\"diff-addedline\">X</td>"));
        assert_eq!(rendered.matches("<tr>").count(), 4);
    }

    #[test]
    fn test_render_wider_context() {
        let left = lines("a\nb\nc\nd\ne\nf\ng");
        let right = lines("a\nb\nc\nX\ne\nf\ng");
        let engine = DiffEngine::new().with_context(2, 0);
        let rendered = engine.render(&compute_diff(&left, &right));

        assert!(rendered.contains(">b<"));
        assert!(rendered.contains(">c<"));
        assert!(!rendered.contains(">e<"));
    }

    #[test]
    fn test_render_merges_close_hunks() {
        let left = lines("a\nb\nc\nd\ne");
        let right = lines("A\nb\nc\nD\ne");
        let rendered = render_diff(&compute_diff(&left, &right), 1, 1);

        // The two-line gap is fully covered by trailing plus leading context
        assert!(rendered.contains(">b<"));
        assert!(rendered.contains(">c<"));
    }

    #[test]
    fn test_render_escapes_html() {
        let empty: Vec<String> = Vec::new();
        let edits = compute_diff(&empty, &lines("<b>bold & \"quoted\"</b>"));
        let rendered = render_diff(&edits, 1, 1);

        assert!(rendered.contains("&lt;b&gt;bold &amp; &quot;quoted&quot;&lt;/b&gt;"));
        assert!(!rendered.contains("<b>"));
    }

    #[test]
    fn test_inline_emphasis() {
        let edits = compute_diff(&lines("The quick fox"), &lines("The slow fox"));
        let rendered = render_diff(&edits, 1, 1);

        assert!(rendered.contains("The <del>quick</del> fox"));
        assert!(rendered.contains("The <ins>slow</ins> fox"));
    }

    #[test]
    fn test_inline_skipped_without_shared_words() {
        let rendered = render_diff(&compute_diff(&lines("alpha"), &lines("omega")), 1, 1);

        assert!(!rendered.contains("<del>"));
        assert!(rendered.contains("<td class=\"diff-deletedline\">alpha</td>"));
    }

    #[test]
    fn test_inline_pairs_uneven_runs() {
        let edits = compute_diff(
            &lines("intro\nThe quick fox\noutro"),
            &lines("intro\nThe slow fox\nA second line\noutro"),
        );
        assert_eq!(edits[1].kind, EditKind::Changed);
        let rendered = render_diff(&edits, 1, 1);

        assert!(rendered.contains("The <del>quick</del> fox"));
        assert!(rendered.contains("The <ins>slow</ins> fox"));
        assert!(rendered.contains("<td class=\"diff-addedline\">A second line</td>"));
        let emphasis = rendered.find("<ins>slow</ins>").unwrap();
        let leftover = rendered.find("A second line").unwrap();
        assert!(emphasis < leftover);
    }

    #[test]
    fn test_inline_disabled() {
        let engine = DiffEngine::new().with_inline(false);
        let rendered = engine.render(&compute_diff(
            &lines("The quick fox"),
            &lines("The slow fox"),
        ));

        assert!(!rendered.contains("<ins>"));
    }

    #[test]
    fn test_diff_texts_normalizes_first() {
        let engine = DiffEngine::new();
        let result = engine.diff_texts("one  two\n\n\n\nthree", "one two\n\nthree");

        assert!(!has_changes(&result.edits));
    }
}
