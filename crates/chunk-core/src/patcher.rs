//! Parser/patcher session over one chunk.
//!
//! A session is short lived: construct it from text or from a host object,
//! locate and mutate sub-chunks, then commit. Nothing reaches the host before
//! [`ChunkParserPatcher::commit`], so an abandoned or failed session leaves
//! the live object untouched.
//!
//! # Examples
//!
//! ```
//! use chunk_core::{ChunkParserPatcher, LineFilter, SubChunkQuery};
//!
//! let mut session = ChunkParserPatcher::from_text(
//!     "<ITEM\n<TAKE\nSOURCE WAVE\nFILE \"a.wav\"\n>\n>\n",
//! )
//! .unwrap();
//!
//! let take = SubChunkQuery::new("TAKE");
//! assert!(session.remove_line(&take, "FILE", 0, &LineFilter::Any).unwrap());
//! assert_eq!(session.to_text(), "<ITEM\n<TAKE\nSOURCE WAVE\n>\n>\n");
//! ```

use std::cell::OnceCell;

use crate::config::PatcherConfig;
use crate::diff::ChunkDiff;
use crate::edit::Edit;
use crate::error::{Error, Result};
use crate::host::{ObjectHandle, ObjectStateHost, UndoBehavior};
use crate::line::{indentation, quote_token, tokenize};
use crate::scan::{ChunkElement, ElementKind, Outline, SubChunkQuery};
use crate::text::{ChunkText, fingerprint_of};

/// A located sub-chunk together with a copy of its lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubChunk {
    pub kind: ElementKind,
    pub tag: String,
    /// First line in the session's text
    pub start: usize,
    /// Last line in the session's text, inclusive
    pub end: usize,
    pub depth: usize,
    pub text: ChunkText,
}

/// Optional substring a field line must contain to match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LineFilter {
    #[default]
    Any,
    Contains(String),
}

impl LineFilter {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    pub fn accepts(&self, line: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Contains(needle) => line.contains(needle.as_str()),
        }
    }
}

impl From<Option<&str>> for LineFilter {
    fn from(needle: Option<&str>) -> Self {
        needle.map_or(Self::Any, Self::contains)
    }
}

/// What a commit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing changed, the host was not called
    Unchanged,
    /// The host accepted the new state
    Committed,
}

#[derive(Debug, Clone)]
struct Origin {
    handle: ObjectHandle,
    fingerprint: String,
}

/// Stateful locate/extract/replace session over a [`ChunkText`].
#[derive(Debug, Clone)]
pub struct ChunkParserPatcher {
    text: ChunkText,
    original: ChunkText,
    outline: OnceCell<Outline>,
    edits: Vec<Edit>,
    origin: Option<Origin>,
    config: PatcherConfig,
}

impl ChunkParserPatcher {
    /// Session over raw chunk text, not bound to any host object
    pub fn from_text(raw: &str) -> Result<Self> {
        Ok(Self::from_chunk(ChunkText::load(raw)?))
    }

    pub fn from_chunk(text: ChunkText) -> Self {
        Self {
            original: text.clone(),
            text,
            outline: OnceCell::new(),
            edits: Vec::new(),
            origin: None,
            config: PatcherConfig::default(),
        }
    }

    /// Session over the current state of a host object
    pub fn from_host<H>(host: &H, handle: ObjectHandle) -> Result<Self>
    where
        H: ObjectStateHost + ?Sized,
    {
        let raw = host
            .get_object_state(handle)
            .map_err(|e| e.into_error(handle))?;
        let mut session = Self::from_text(&raw)?;
        tracing::debug!(%handle, lines = session.text.len(), "opened chunk session");
        session.origin = Some(Origin {
            handle,
            fingerprint: fingerprint_of(&raw),
        });
        Ok(session)
    }

    pub fn with_config(mut self, config: PatcherConfig) -> Self {
        self.config = config;
        self.outline = OnceCell::new();
        self
    }

    pub fn config(&self) -> &PatcherConfig {
        &self.config
    }

    /// Host object this session commits to
    pub fn handle(&self) -> Option<ObjectHandle> {
        self.origin.as_ref().map(|o| o.handle)
    }

    pub fn text(&self) -> &ChunkText {
        &self.text
    }

    pub fn to_text(&self) -> String {
        self.text.to_text()
    }

    /// Hand the buffer back to the caller instead of committing to a host
    pub fn into_text(self) -> ChunkText {
        self.text
    }

    /// Whether the buffer differs from what was loaded or last committed
    pub fn is_dirty(&self) -> bool {
        self.text != self.original
    }

    /// Edits applied since the session started or last committed
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Structural outline of the current buffer, built on first use
    pub fn outline(&self) -> Result<&Outline> {
        if let Some(outline) = self.outline.get() {
            return Ok(outline);
        }
        let built = Outline::build(&self.text, self.config.max_depth)?;
        Ok(self.outline.get_or_init(|| built))
    }

    /// Extract the sub-chunk `query` addresses.
    ///
    /// Returns `Ok(None)` when the text has no such element and
    /// [`Error::MalformedChunk`] when the text is not a valid chunk.
    pub fn get_sub_chunk(&self, query: &SubChunkQuery) -> Result<Option<SubChunk>> {
        let found = self.outline()?.locate(query);
        tracing::debug!(
            tag = %query.tag,
            occurrence = query.occurrence,
            start_line = query.start_line,
            found = found.map(|e| e.start),
            "get sub-chunk"
        );
        found.map(|element| self.extract(element)).transpose()
    }

    /// Every element matching `query`'s filters, in document order
    pub fn sub_chunks(&self, query: &SubChunkQuery) -> Result<Vec<SubChunk>> {
        self.outline()?
            .matches(query)
            .map(|element| self.extract(element))
            .collect()
    }

    /// Replace the sub-chunk `query` addresses with `new_content`.
    ///
    /// The replacement may have a different line count. When nothing matches
    /// the buffer is left exactly as it was and `Ok(false)` is returned.
    pub fn replace_sub_chunk(
        &mut self,
        query: &SubChunkQuery,
        new_content: &ChunkText,
    ) -> Result<bool> {
        let Some(target) = self.outline()?.locate(query).cloned() else {
            tracing::debug!(tag = %query.tag, occurrence = query.occurrence, "replace target not found");
            return Ok(false);
        };
        check_fragment(new_content, self.config.max_depth)?;

        let old_lines = self.lines_of(&target).to_vec();
        self.apply(Edit::replace(
            target.start,
            old_lines,
            new_content.lines().to_vec(),
        ))?;
        Ok(true)
    }

    /// Remove the sub-chunk `query` addresses
    pub fn remove_sub_chunk(&mut self, query: &SubChunkQuery) -> Result<bool> {
        let Some(target) = self.outline()?.locate(query).cloned() else {
            return Ok(false);
        };
        let old_lines = self.lines_of(&target).to_vec();
        self.apply(Edit::delete(target.start, old_lines))?;
        Ok(true)
    }

    /// Remove one field line from a block.
    ///
    /// Locates the block `block` addresses, then the `field_occurrence`-th
    /// direct child line named `field` that passes `filter`, and removes
    /// exactly that line.
    pub fn remove_line(
        &mut self,
        block: &SubChunkQuery,
        field: &str,
        field_occurrence: usize,
        filter: &LineFilter,
    ) -> Result<bool> {
        let Some(line) = self.field_line(block, field, field_occurrence, filter)? else {
            tracing::debug!(block = %block.tag, field, field_occurrence, "line to remove not found");
            return Ok(false);
        };
        let old = self.text.line(line)?.to_string();
        self.apply(Edit::delete(line, vec![old]))?;
        Ok(true)
    }

    /// Insert `lines` at the end of a block's body, right before its
    /// closing marker, leaving sibling content untouched.
    ///
    /// Returns `Ok(false)` when the block is missing or `lines` is empty.
    pub fn append_to_block<S: AsRef<str>>(
        &mut self,
        block: &SubChunkQuery,
        lines: &[S],
    ) -> Result<bool> {
        let Some(target) = self.locate_block(block)? else {
            return Ok(false);
        };
        self.insert_fragment(target.end, lines)
    }

    /// Insert `lines` right before the `field_occurrence`-th direct child
    /// line named `field` of a block.
    pub fn insert_before_field<S: AsRef<str>>(
        &mut self,
        block: &SubChunkQuery,
        field: &str,
        field_occurrence: usize,
        lines: &[S],
    ) -> Result<bool> {
        let Some(at) = self.field_line(block, field, field_occurrence, &LineFilter::Any)? else {
            return Ok(false);
        };
        self.insert_fragment(at, lines)
    }

    /// Unquoted values of the first direct child line named `field`
    pub fn get_field(&self, block: &SubChunkQuery, field: &str) -> Result<Option<Vec<String>>> {
        let Some(line) = self.field_line(block, field, 0, &LineFilter::Any)? else {
            return Ok(None);
        };
        let values = tokenize(self.text.line(line)?)
            .into_iter()
            .skip(1)
            .map(|t| t.value.to_string())
            .collect();
        Ok(Some(values))
    }

    /// Rewrite the first direct child line named `field` with `values`,
    /// keeping its indentation.
    pub fn set_field<S: AsRef<str>>(
        &mut self,
        block: &SubChunkQuery,
        field: &str,
        values: &[S],
    ) -> Result<bool> {
        let Some(line) = self.field_line(block, field, 0, &LineFilter::Any)? else {
            return Ok(false);
        };
        let old = self.text.line(line)?.to_string();
        let new = format_field_line(indentation(&old), field, values);
        if new == old {
            return Ok(true);
        }
        self.apply(Edit::replace(line, vec![old], vec![new]))?;
        Ok(true)
    }

    /// Line changes since the session started or last committed
    pub fn diff(&self) -> ChunkDiff {
        ChunkDiff::compute(&self.original.to_text(), &self.text.to_text())
    }

    /// Revert the most recent uncommitted edit
    pub fn undo_last(&mut self) -> Result<bool> {
        let Some(edit) = self.edits.last() else {
            return Ok(false);
        };
        edit.inverse().apply(&mut self.text)?;
        self.edits.pop();
        self.outline = OnceCell::new();
        Ok(true)
    }

    /// Drop every uncommitted edit
    pub fn rollback(&mut self) {
        if self.is_dirty() {
            tracing::debug!(edits = self.edits.len(), "rolling back chunk session");
        }
        self.text = self.original.clone();
        self.edits.clear();
        self.outline = OnceCell::new();
    }

    /// Hand the buffer to the host object the session was opened on.
    ///
    /// Does not call the host when nothing changed. With
    /// `verify_before_commit` the host state is read again first and
    /// [`Error::StaleObject`] is returned if it changed since the session
    /// read it. A host rejection yields [`Error::HostRejected`]; the session
    /// keeps its buffer and stays dirty.
    pub fn commit<H>(&mut self, host: &mut H, undo: UndoBehavior) -> Result<CommitOutcome>
    where
        H: ObjectStateHost + ?Sized,
    {
        let (handle, fingerprint) = match &self.origin {
            Some(origin) => (origin.handle, origin.fingerprint.clone()),
            None => return Err(Error::Detached),
        };
        if !self.is_dirty() {
            tracing::debug!(%handle, "nothing to commit");
            return Ok(CommitOutcome::Unchanged);
        }

        if self.config.verify_before_commit {
            let current = host
                .get_object_state(handle)
                .map_err(|e| e.into_error(handle))?;
            if fingerprint_of(&current) != fingerprint {
                tracing::warn!(%handle, "object changed under the session, refusing to commit");
                return Err(Error::StaleObject(handle));
            }
        }

        self.outline()?;
        let state = self.text.to_text();
        if let Err(e) = host.set_object_state(handle, &state, undo) {
            tracing::warn!(%handle, error = %e, "host rejected chunk");
            return Err(e.into_error(handle));
        }

        tracing::info!(%handle, edits = self.edits.len(), ?undo, "committed chunk");
        self.original = self.text.clone();
        self.edits.clear();
        self.origin = Some(Origin {
            handle,
            fingerprint: fingerprint_of(&state),
        });
        Ok(CommitOutcome::Committed)
    }

    /// Same as [`ChunkParserPatcher::commit`] with the configured undo behavior
    pub fn commit_default<H>(&mut self, host: &mut H) -> Result<CommitOutcome>
    where
        H: ObjectStateHost + ?Sized,
    {
        let undo = self.config.undo;
        self.commit(host, undo)
    }

    pub(crate) fn locate_block(&self, query: &SubChunkQuery) -> Result<Option<ChunkElement>> {
        let found = self.outline()?.locate(query).cloned();
        Ok(found.filter(ChunkElement::is_block))
    }

    /// Line index of the `occurrence`-th direct child of the addressed block
    /// named `field` that passes `filter`
    pub(crate) fn field_line(
        &self,
        block: &SubChunkQuery,
        field: &str,
        occurrence: usize,
        filter: &LineFilter,
    ) -> Result<Option<usize>> {
        let outline = self.outline()?;
        let Some(parent) = outline.locate(block).filter(|e| e.is_block()) else {
            return Ok(None);
        };
        let line = outline
            .children(parent.id)
            .filter(|e| e.kind == ElementKind::Field && e.tag == field)
            .map(|e| e.start)
            .filter(|&i| filter.accepts(&self.text.lines()[i]))
            .nth(occurrence);
        Ok(line)
    }

    pub(crate) fn lines_of(&self, element: &ChunkElement) -> &[String] {
        &self.text.lines()[element.start..=element.end]
    }

    /// Insert balanced `lines` at `at`; `Ok(false)` if there is nothing to insert
    pub(crate) fn insert_fragment<S: AsRef<str>>(&mut self, at: usize, lines: &[S]) -> Result<bool> {
        let fragment = ChunkText::from_lines(lines.iter().map(|l| l.as_ref().to_string()))?;
        check_fragment(&fragment, self.config.max_depth)?;
        if fragment.is_empty() {
            return Ok(false);
        }
        self.apply(Edit::insert(at, fragment.lines().to_vec()))?;
        Ok(true)
    }

    /// Apply `edit` and rebuild the outline. An edit that leaves the buffer
    /// malformed is reverted and its error returned.
    pub(crate) fn apply(&mut self, edit: Edit) -> Result<()> {
        edit.apply(&mut self.text)?;
        let outline = match Outline::build(&self.text, self.config.max_depth) {
            Ok(outline) => outline,
            Err(e) => {
                tracing::debug!(kind = ?edit.kind, at = edit.at, error = %e, "edit rejected");
                edit.inverse().apply(&mut self.text)?;
                return Err(e);
            }
        };
        tracing::debug!(kind = ?edit.kind, at = edit.at, delta = edit.line_delta(), "applied edit");
        self.outline = OnceCell::from(outline);
        self.edits.push(edit);
        Ok(())
    }

    fn extract(&self, element: &ChunkElement) -> Result<SubChunk> {
        Ok(SubChunk {
            kind: element.kind,
            tag: element.tag.clone(),
            start: element.start,
            end: element.end,
            depth: element.depth,
            text: self.text.slice(element.start, element.end)?,
        })
    }
}

/// Inserted content must be balanced on its own
fn check_fragment(fragment: &ChunkText, max_depth: usize) -> Result<()> {
    Outline::build(fragment, max_depth).map(|_| ())
}

pub(crate) fn format_field_line<S: AsRef<str>>(indent: &str, field: &str, values: &[S]) -> String {
    let mut line = format!("{indent}{field}");
    for value in values {
        line.push(' ');
        line.push_str(&quote_token(value.as_ref()));
    }
    line
}
