//! Line diff between two versions of a chunk

use similar::{ChangeTag, TextDiff};

/// Lines of context around each hunk in unified output
const CONTEXT_RADIUS: usize = 2;

/// Result of comparing two chunk texts line by line
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDiff {
    /// Are the texts byte-identical?
    pub is_unchanged: bool,
    /// Added and removed lines in document order
    pub changes: Vec<LineChange>,
    /// Similarity ratio (0.0 to 1.0)
    pub similarity: f64,
    unified: String,
}

/// A single changed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineChange {
    /// Line present only in the new text, at this index
    Added { line: usize, content: String },
    /// Line present only in the old text, at this index
    Removed { line: usize, content: String },
}

impl ChunkDiff {
    pub fn unchanged() -> Self {
        Self {
            is_unchanged: true,
            changes: Vec::new(),
            similarity: 1.0,
            unified: String::new(),
        }
    }

    /// Compare `old` and `new` using the `similar` crate's line diff
    pub fn compute(old: &str, new: &str) -> Self {
        if old == new {
            return Self::unchanged();
        }

        let text_diff = TextDiff::from_lines(old, new);
        let similarity = text_diff.ratio() as f64;

        let mut changes = Vec::new();
        for change in text_diff.iter_all_changes() {
            let content = strip_terminator(change.value()).to_string();
            match change.tag() {
                ChangeTag::Delete => {
                    if let Some(line) = change.old_index() {
                        changes.push(LineChange::Removed { line, content });
                    }
                }
                ChangeTag::Insert => {
                    if let Some(line) = change.new_index() {
                        changes.push(LineChange::Added { line, content });
                    }
                }
                ChangeTag::Equal => {}
            }
        }

        let unified = text_diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header("original", "patched")
            .to_string();

        Self {
            is_unchanged: false,
            changes,
            similarity,
            unified,
        }
    }

    /// Unified diff text; empty when unchanged
    pub fn unified(&self) -> &str {
        &self.unified
    }

    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().filter_map(|c| match c {
            LineChange::Added { content, .. } => Some(content.as_str()),
            LineChange::Removed { .. } => None,
        })
    }

    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().filter_map(|c| match c {
            LineChange::Removed { content, .. } => Some(content.as_str()),
            LineChange::Added { .. } => None,
        })
    }
}

impl Default for ChunkDiff {
    fn default() -> Self {
        Self::unchanged()
    }
}

fn strip_terminator(value: &str) -> &str {
    value.strip_suffix('\n').unwrap_or(value)
}
