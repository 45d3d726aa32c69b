//! Nesting-depth scanner shared by every locate operation.
//!
//! [`Outline::build`] classifies each line once and records every block and
//! field line as a [`ChunkElement`] in document order. Locating, extracting,
//! replacing and removing all resolve their targets through
//! [`Outline::locate`].

use crate::error::{Error, Result};
use crate::line::LineKind;
use crate::text::ChunkText;

/// Default nesting limit; the host never writes anywhere near this deep
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<TAG` ... `>` line range
    Block,
    /// Single `NAME value...` line
    Field,
}

/// A block or field line located in a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkElement {
    /// Position in [`Outline::elements`]
    pub id: usize,
    pub kind: ElementKind,
    /// Block tag or field name
    pub tag: String,
    /// Opening line (or the field line)
    pub start: usize,
    /// Closing marker line, inclusive; equals `start` for field lines
    pub end: usize,
    /// Number of enclosing blocks
    pub depth: usize,
    /// Innermost enclosing block
    pub parent: Option<usize>,
}

impl ChunkElement {
    pub fn is_block(&self) -> bool {
        self.kind == ElementKind::Block
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Address of a sub-chunk: the Nth element tagged `tag` at or after
/// `start_line`, optionally restricted to the inside of an ancestor block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubChunkQuery {
    pub tag: String,
    pub occurrence: usize,
    pub start_line: usize,
    /// Only match strictly inside a block with this tag
    pub ancestor: Option<String>,
    /// Stop scanning at the first block opened with this tag
    pub stop_at: Option<String>,
    /// Only match elements with exactly this many enclosing blocks
    pub depth: Option<usize>,
}

impl SubChunkQuery {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            occurrence: 0,
            start_line: 0,
            ancestor: None,
            stop_at: None,
            depth: None,
        }
    }

    pub fn occurrence(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence;
        self
    }

    pub fn from_line(mut self, start_line: usize) -> Self {
        self.start_line = start_line;
        self
    }

    pub fn within(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestor = Some(ancestor.into());
        self
    }

    pub fn stop_at(mut self, tag: impl Into<String>) -> Self {
        self.stop_at = Some(tag.into());
        self
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }
}

/// Structural outline of a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    elements: Vec<ChunkElement>,
}

impl Outline {
    /// Scan `text` once, matching every opening line with its closing marker.
    ///
    /// Fails with [`Error::MalformedChunk`] on a `>` with no open block, on a
    /// block that is still open at the end of the text, or on nesting deeper
    /// than `max_depth`.
    pub fn build(text: &ChunkText, max_depth: usize) -> Result<Self> {
        let mut elements: Vec<ChunkElement> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        for (i, line) in text.lines().iter().enumerate() {
            match LineKind::classify(line) {
                LineKind::Open { tag } => {
                    if open.len() >= max_depth {
                        tracing::warn!(line = i, max_depth, "chunk nesting too deep");
                        return Err(Error::malformed(
                            i,
                            format!("nesting deeper than {max_depth} levels"),
                        ));
                    }
                    let id = elements.len();
                    elements.push(ChunkElement {
                        id,
                        kind: ElementKind::Block,
                        tag,
                        start: i,
                        end: i,
                        depth: open.len(),
                        parent: open.last().copied(),
                    });
                    open.push(id);
                }
                LineKind::Close => {
                    let Some(id) = open.pop() else {
                        tracing::warn!(line = i, "unbalanced closing marker");
                        return Err(Error::malformed(i, "closing marker without an open block"));
                    };
                    elements[id].end = i;
                }
                LineKind::Field { name } => {
                    let id = elements.len();
                    elements.push(ChunkElement {
                        id,
                        kind: ElementKind::Field,
                        tag: name,
                        start: i,
                        end: i,
                        depth: open.len(),
                        parent: open.last().copied(),
                    });
                }
                LineKind::Blank => {}
            }
        }

        if let Some(&id) = open.last() {
            let block = &elements[id];
            tracing::warn!(line = block.start, tag = %block.tag, "block never closes");
            return Err(Error::malformed(
                block.start,
                format!("block <{} never closes", block.tag),
            ));
        }

        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[ChunkElement] {
        &self.elements
    }

    pub fn element(&self, id: usize) -> Option<&ChunkElement> {
        self.elements.get(id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &ChunkElement> {
        self.elements.iter().filter(|e| e.is_block())
    }

    /// Elements whose innermost enclosing block is `parent`
    pub fn children(&self, parent: usize) -> impl Iterator<Item = &ChunkElement> {
        self.elements
            .iter()
            .filter(move |e| e.parent == Some(parent))
    }

    /// Whether `element` sits somewhere inside a block tagged `tag`
    pub fn has_ancestor(&self, element: &ChunkElement, tag: &str) -> bool {
        let mut parent = element.parent;
        while let Some(id) = parent {
            let block = &self.elements[id];
            if block.tag == tag {
                return true;
            }
            parent = block.parent;
        }
        false
    }

    /// All elements satisfying `query`'s filters, ignoring its occurrence
    pub fn matches<'a, 'q>(
        &'a self,
        query: &'q SubChunkQuery,
    ) -> impl Iterator<Item = &'a ChunkElement> + use<'a, 'q> {
        let stop = query
            .stop_at
            .as_deref()
            .and_then(|tag| {
                self.blocks()
                    .find(|e| e.start >= query.start_line && e.tag == tag)
            })
            .map_or(usize::MAX, |e| e.start);

        self.elements.iter().filter(move |e| {
            e.start >= query.start_line
                && e.start < stop
                && e.tag == query.tag
                && query.depth.is_none_or(|d| d == e.depth)
                && query
                    .ancestor
                    .as_deref()
                    .is_none_or(|a| self.has_ancestor(e, a))
        })
    }

    /// The element `query` addresses, if present
    pub fn locate(&self, query: &SubChunkQuery) -> Option<&ChunkElement> {
        self.matches(query).nth(query.occurrence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(raw: &str) -> Result<Outline> {
        Outline::build(&ChunkText::load(raw).unwrap(), DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn records_depth_and_parent() {
        let outline = outline("<ITEM\nPOSITION 1\n<SOURCE WAVE\nFILE \"a.wav\"\n>\n>\n").unwrap();
        let source = outline.locate(&SubChunkQuery::new("SOURCE")).unwrap();
        assert_eq!((source.start, source.end, source.depth), (2, 4, 1));
        assert_eq!(source.parent, Some(0));

        let file = outline.locate(&SubChunkQuery::new("FILE")).unwrap();
        assert_eq!(file.depth, 2);
        assert_eq!(file.parent, Some(source.id));
    }

    #[test]
    fn located_element_outlives_query() {
        let outline = outline("<ITEM\n<TAKE\nNAME a\n>\n>\n").unwrap();
        let take = {
            let query = SubChunkQuery::new("TAKE").within("ITEM");
            outline.locate(&query)
        };
        assert_eq!(take.map(|e| (e.start, e.end)), Some((1, 3)));
    }

    #[test]
    fn stray_close_is_malformed() {
        let err = outline("<ITEM\n>\n>\n").unwrap_err();
        assert!(matches!(err, Error::MalformedChunk { line: 2, .. }));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let text = ChunkText::load("<A\n<B\n<C\n>\n>\n>\n").unwrap();
        assert!(Outline::build(&text, 3).is_ok());
        let err = Outline::build(&text, 2).unwrap_err();
        assert!(matches!(err, Error::MalformedChunk { line: 2, .. }));
    }

    #[test]
    fn stop_at_bounds_the_scan() {
        let outline =
            outline("<TRACK\n<FXCHAIN\n>\n<ITEM\n<FXCHAIN\n>\n>\n>\n").unwrap();
        let query = SubChunkQuery::new("FXCHAIN").occurrence(1).stop_at("ITEM");
        assert!(outline.locate(&query).is_none());
        let query = SubChunkQuery::new("FXCHAIN").stop_at("ITEM");
        assert_eq!(outline.locate(&query).map(|e| e.start), Some(1));
    }
}
