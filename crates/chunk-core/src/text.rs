//! Line-indexed chunk text buffer

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Bound, RangeBounds};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Line terminator the host writes and expects
pub const LINE_TERMINATOR: char = '\n';

/// Owned, mutable chunk text split into lines.
///
/// Lines are stored verbatim: indentation and any `\r` before the terminator
/// stay part of the line, so untouched text is reproduced byte for byte by
/// [`ChunkText::to_text`].
///
/// Whether the last line carries a terminator is a property of the loaded
/// text and survives edits, including removing every line and inserting
/// again. A buffer that starts empty is terminated.
///
/// Indices handed out before an insert or remove are not adjusted; callers
/// must locate blocks again after mutating.
#[derive(Debug, Clone)]
pub struct ChunkText {
    lines: Vec<String>,
    trailing_terminator: bool,
}

impl ChunkText {
    /// Empty buffer, e.g. for building a synthetic block
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            trailing_terminator: true,
        }
    }

    /// Split raw host text into lines.
    ///
    /// Fails with [`Error::Parse`] if the text contains a NUL byte, which the
    /// host's string interface cannot carry.
    pub fn load(raw: &str) -> Result<Self> {
        if let Some(pos) = raw.find('\0') {
            let line = raw[..pos].matches(LINE_TERMINATOR).count();
            return Err(Error::parse(line, "embedded NUL byte"));
        }

        if raw.is_empty() {
            return Ok(Self::new());
        }

        let trailing_terminator = raw.ends_with(LINE_TERMINATOR);
        let body = raw.strip_suffix(LINE_TERMINATOR).unwrap_or(raw);
        let lines = body.split(LINE_TERMINATOR).map(str::to_string).collect();

        Ok(Self {
            lines,
            trailing_terminator,
        })
    }

    /// Build from individual lines; the result ends with a terminator.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines
            .into_iter()
            .map(Into::into)
            .enumerate()
            .map(|(i, line)| check_line(i, line))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            lines,
            trailing_terminator: true,
        })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Get line `index`
    pub fn line(&self, index: usize) -> Result<&str> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(Error::LineOutOfRange {
                index,
                len: self.lines.len(),
            })
    }

    /// Replace line `index`, returning the previous content
    pub fn set_line(&mut self, index: usize, value: impl Into<String>) -> Result<String> {
        let len = self.lines.len();
        let value = check_line(index, value.into())?;
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(Error::LineOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Insert lines so the first new line ends up at index `at`.
    ///
    /// `at == len()` appends.
    pub fn insert_lines<I, S>(&mut self, at: usize, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.lines.len();
        self.splice(at, 0, lines)?;
        Ok(self.lines.len() - before)
    }

    /// Remove a range of lines and return them.
    pub fn remove_lines<R: RangeBounds<usize>>(&mut self, range: R) -> Result<Vec<String>> {
        let len = self.lines.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if start > end || end > len {
            return Err(Error::LineOutOfRange {
                index: end.max(start).saturating_sub(1),
                len,
            });
        }
        Ok(self.lines.drain(start..end).collect())
    }

    /// Replace `count` lines starting at `at` with `lines` in one step.
    ///
    /// Nothing changes unless the range exists and every new line is valid.
    pub fn splice<I, S>(&mut self, at: usize, count: usize, lines: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let len = self.lines.len();
        let end = at.checked_add(count).filter(|&end| end <= len);
        let Some(end) = end else {
            return Err(Error::LineOutOfRange {
                index: at.saturating_add(count).saturating_sub(1).max(at),
                len,
            });
        };
        let new_lines = lines
            .into_iter()
            .map(Into::into)
            .enumerate()
            .map(|(i, line)| check_line(at + i, line))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.lines.splice(at..end, new_lines).collect())
    }

    /// Copy of lines `start..=end`
    pub fn slice(&self, start: usize, end: usize) -> Result<ChunkText> {
        if start > end || end >= self.lines.len() {
            return Err(Error::LineOutOfRange {
                index: end,
                len: self.lines.len(),
            });
        }
        Ok(Self {
            lines: self.lines[start..=end].to_vec(),
            trailing_terminator: true,
        })
    }

    /// Reassemble the text with the host line terminator
    pub fn to_text(&self) -> String {
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(LINE_TERMINATOR);
            }
            out.push_str(line);
        }
        if self.terminated() {
            out.push(LINE_TERMINATOR);
        }
        out
    }

    /// SHA-256 hex digest of [`ChunkText::to_text`]
    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.to_text())
    }

    fn terminated(&self) -> bool {
        self.trailing_terminator && !self.lines.is_empty()
    }
}

impl Default for ChunkText {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ChunkText {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines && self.terminated() == other.terminated()
    }
}

impl Eq for ChunkText {}

impl Hash for ChunkText {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lines.hash(state);
        self.terminated().hash(state);
    }
}

impl fmt::Display for ChunkText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl std::str::FromStr for ChunkText {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::load(s)
    }
}

/// SHA-256 hex digest of raw chunk text
pub fn fingerprint_of(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn check_line(index: usize, line: String) -> Result<String> {
    if line.contains(LINE_TERMINATOR) {
        return Err(Error::parse(index, "line contains a line terminator"));
    }
    if line.contains('\0') {
        return Err(Error::parse(index, "embedded NUL byte"));
    }
    Ok(line)
}
