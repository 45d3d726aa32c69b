//! Takes inside an item chunk.
//!
//! An `ITEM` block holds its own fields followed by one run of lines per
//! take. The first take starts at the first `NAME` line or `<SOURCE` block;
//! every later take starts at a `TAKE` line and runs until the next one or the
//! item's closing marker. An empty take has no `<SOURCE` block and is written
//! by the host as `TAKE NULL`.

use crate::edit::Edit;
use crate::error::Result;
use crate::line::{indentation, tokenize};
use crate::patcher::ChunkParserPatcher;
use crate::scan::{ElementKind, Outline, SubChunkQuery};
use crate::text::ChunkText;

const ITEM_TAG: &str = "ITEM";
const TAKE_FIELD: &str = "TAKE";
const NAME_FIELD: &str = "NAME";
const SOURCE_TAG: &str = "SOURCE";
const EMPTY_TAKE_FLAG: &str = "NULL";

/// Line range of one take inside an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeSpan {
    pub index: usize,
    pub start: usize,
    /// Last line of the take, inclusive
    pub end: usize,
    /// Lines of the take's `<SOURCE` block, if it has one
    pub source: Option<(usize, usize)>,
}

impl TakeSpan {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }
}

impl ChunkParserPatcher {
    /// Takes of the first `ITEM` block, in order
    pub fn takes(&self) -> Result<Vec<TakeSpan>> {
        Ok(take_spans(self.outline()?))
    }

    pub fn take_chunk(&self, index: usize) -> Result<Option<ChunkText>> {
        let Some(span) = self.takes()?.get(index).copied() else {
            return Ok(None);
        };
        Ok(Some(self.text().slice(span.start, span.end)?))
    }

    /// Replace every line of take `index` with `chunk`
    pub fn replace_take(&mut self, index: usize, chunk: &ChunkText) -> Result<bool> {
        let Some(span) = self.takes()?.get(index).copied() else {
            return Ok(false);
        };
        Outline::build(chunk, self.config().max_depth)?;
        let old = self.text().lines()[span.start..=span.end].to_vec();
        self.apply(Edit::replace(span.start, old, chunk.lines().to_vec()))?;
        Ok(true)
    }

    /// The `<SOURCE` block of take `index`; `None` for an empty or missing take
    pub fn source_state(&self, index: usize) -> Result<Option<ChunkText>> {
        let Some(span) = self.takes()?.get(index).copied() else {
            return Ok(None);
        };
        span.source
            .map(|(start, end)| self.text().slice(start, end))
            .transpose()
    }

    /// Set the `<SOURCE` block of take `index`.
    ///
    /// An existing source block is replaced. An empty take gets `source`
    /// appended and loses its `NULL` marker.
    pub fn set_source_state(&mut self, index: usize, source: &ChunkText) -> Result<bool> {
        let Some(span) = self.takes()?.get(index).copied() else {
            return Ok(false);
        };
        Outline::build(source, self.config().max_depth)?;

        match span.source {
            Some((start, end)) => {
                let old = self.text().lines()[start..=end].to_vec();
                self.apply(Edit::replace(start, old, source.lines().to_vec()))?;
            }
            None => {
                let old = self.text().lines()[span.start..=span.end].to_vec();
                let mut new = old.clone();
                if let Some(first) = new.first_mut() {
                    *first = strip_empty_flag(first);
                }
                new.extend(source.lines().iter().cloned());
                self.apply(Edit::replace(span.start, old, new))?;
            }
        }
        tracing::debug!(take = index, "set take source");
        Ok(true)
    }
}

fn take_spans(outline: &Outline) -> Vec<TakeSpan> {
    let item_query = SubChunkQuery::new(ITEM_TAG);
    let Some(item) = outline.locate(&item_query).filter(|e| e.is_block()) else {
        return Vec::new();
    };

    let children: Vec<_> = outline.children(item.id).collect();
    let starts_take = |kind: ElementKind, tag: &str| match kind {
        ElementKind::Field => tag == NAME_FIELD || tag == TAKE_FIELD,
        ElementKind::Block => tag == SOURCE_TAG,
    };
    let Some(first) = children.iter().position(|e| starts_take(e.kind, &e.tag)) else {
        return Vec::new();
    };

    let mut starts = vec![first];
    starts.extend(
        children
            .iter()
            .enumerate()
            .skip(first + 1)
            .filter(|(_, e)| e.kind == ElementKind::Field && e.tag == TAKE_FIELD)
            .map(|(i, _)| i),
    );

    starts
        .iter()
        .enumerate()
        .map(|(index, &child)| {
            let next = starts.get(index + 1).copied();
            let start = children[child].start;
            let end = next.map_or(item.end - 1, |n| children[n].start - 1);
            let last_child = next.unwrap_or(children.len());
            let source = children[child..last_child]
                .iter()
                .find(|e| e.is_block() && e.tag == SOURCE_TAG)
                .map(|e| (e.start, e.end));
            TakeSpan {
                index,
                start,
                end,
                source,
            }
        })
        .collect()
}

/// `TAKE NULL SEL` -> `TAKE SEL`, keeping indentation
fn strip_empty_flag(line: &str) -> String {
    let tokens = tokenize(line);
    if !tokens.iter().any(|t| t.value == EMPTY_TAKE_FLAG && t.quote.is_none()) {
        return line.to_string();
    }
    let kept: Vec<&str> = tokens
        .iter()
        .filter(|t| !(t.value == EMPTY_TAKE_FLAG && t.quote.is_none()))
        .map(|t| &line[t.span.clone()])
        .collect();
    format!("{}{}", indentation(line), kept.join(" "))
}
