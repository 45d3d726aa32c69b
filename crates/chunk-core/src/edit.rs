//! Line edits applied to a chunk, recorded for rollback.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::ChunkText;

/// The kind of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Insert new lines.
    Insert,
    /// Replace existing lines.
    Replace,
    /// Delete lines.
    Delete,
}

/// A line-level edit on chunk text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// The kind of edit.
    pub kind: EditKind,
    /// Index of the first affected line.
    pub at: usize,
    /// Lines present before the edit (empty for Insert).
    pub old_lines: Vec<String>,
    /// Lines present after the edit (empty for Delete).
    pub new_lines: Vec<String>,
}

impl Edit {
    pub fn insert(at: usize, lines: Vec<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            at,
            old_lines: Vec::new(),
            new_lines: lines,
        }
    }

    pub fn delete(at: usize, lines: Vec<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            at,
            old_lines: lines,
            new_lines: Vec::new(),
        }
    }

    pub fn replace(at: usize, old_lines: Vec<String>, new_lines: Vec<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            at,
            old_lines,
            new_lines,
        }
    }

    /// The edit that undoes this one
    pub fn inverse(&self) -> Self {
        let kind = match self.kind {
            EditKind::Insert => EditKind::Delete,
            EditKind::Delete => EditKind::Insert,
            EditKind::Replace => EditKind::Replace,
        };
        Self {
            kind,
            at: self.at,
            old_lines: self.new_lines.clone(),
            new_lines: self.old_lines.clone(),
        }
    }

    /// Change in line count caused by this edit
    pub fn line_delta(&self) -> isize {
        self.new_lines.len() as isize - self.old_lines.len() as isize
    }

    /// Apply to `text`.
    ///
    /// The lines at `at` must equal `old_lines`; otherwise the text is left
    /// untouched and [`Error::EditMismatch`] is returned.
    pub fn apply(&self, text: &mut ChunkText) -> Result<()> {
        let end = self.at + self.old_lines.len();
        let current = text.lines().get(self.at..end);
        if current != Some(self.old_lines.as_slice()) {
            return Err(Error::EditMismatch { line: self.at });
        }

        text.splice(self.at, self.old_lines.len(), self.new_lines.iter().cloned())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn inverse_of_insert_is_delete() {
        let edit = Edit::insert(3, lines(&["PARM_TCP 1"]));
        let inverse = edit.inverse();
        assert_eq!(inverse.kind, EditKind::Delete);
        assert_eq!(inverse.at, 3);
        assert_eq!(inverse.old_lines, lines(&["PARM_TCP 1"]));
        assert!(inverse.new_lines.is_empty());
    }

    #[test]
    fn apply_then_inverse_restores_text() {
        let original = ChunkText::load("<TAKE\nSOURCE WAVE\nFILE \"a.wav\"\n>\n").unwrap();
        let mut text = original.clone();

        let edit = Edit::replace(2, lines(&["FILE \"a.wav\""]), lines(&["FILE \"b.wav\"", "X 1"]));
        edit.apply(&mut text).unwrap();
        assert_eq!(text.to_text(), "<TAKE\nSOURCE WAVE\nFILE \"b.wav\"\nX 1\n>\n");
        assert_eq!(edit.line_delta(), 1);

        edit.inverse().apply(&mut text).unwrap();
        assert_eq!(text, original);
    }

    #[test]
    fn replacing_every_line_keeps_missing_terminator() {
        let original = ChunkText::load("<ITEM\nPOSITION 1\n>").unwrap();
        let mut text = original.clone();

        let edit = Edit::replace(
            0,
            lines(&["<ITEM", "POSITION 1", ">"]),
            lines(&["<ITEM", "POSITION 2", ">"]),
        );
        edit.apply(&mut text).unwrap();
        assert_eq!(text.to_text(), "<ITEM\nPOSITION 2\n>");

        edit.inverse().apply(&mut text).unwrap();
        assert_eq!(text, original);
    }

    #[test]
    fn apply_rejects_stale_edit() {
        let mut text = ChunkText::load("a\nb\n").unwrap();
        let edit = Edit::delete(0, lines(&["b"]));
        assert!(matches!(
            edit.apply(&mut text),
            Err(Error::EditMismatch { line: 0 })
        ));
        assert_eq!(text.to_text(), "a\nb\n");
    }
}
