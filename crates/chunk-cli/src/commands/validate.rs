//! Validate command implementation

use std::path::Path;

use colored::Colorize;

use chunk_core::{ChunkText, ElementKind, Outline, PatcherConfig};

use crate::error::{CliError, Result};

/// Summary of a well-formed chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub lines: usize,
    pub blocks: usize,
    pub fields: usize,
    pub max_depth: usize,
}

/// Run the validate command
///
/// A malformed chunk is an error, so the exit status tells scripts whether
/// the file is usable.
pub fn run_validate(path: &Path, config: &PatcherConfig) -> Result<ChunkSummary> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::file(path, e))?;
    let summary = summarize(&content, config)?;

    println!(
        "{} {}: {} lines, {} blocks, {} fields, depth {}",
        "OK".green().bold(),
        path.display().to_string().yellow(),
        summary.lines,
        summary.blocks,
        summary.fields,
        summary.max_depth,
    );
    Ok(summary)
}

fn summarize(content: &str, config: &PatcherConfig) -> Result<ChunkSummary> {
    let text = ChunkText::load(content)?;
    let outline = Outline::build(&text, config.max_depth)?;
    let count = |kind: ElementKind| outline.elements().iter().filter(|e| e.kind == kind).count();

    Ok(ChunkSummary {
        lines: text.len(),
        blocks: count(ElementKind::Block),
        fields: count(ElementKind::Field),
        max_depth: outline
            .blocks()
            .map(|b| b.depth + 1)
            .max()
            .unwrap_or_default(),
    })
}
