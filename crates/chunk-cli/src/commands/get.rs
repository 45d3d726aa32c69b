//! Get command implementation

use std::path::Path;

use serde_json::json;

use chunk_core::{ElementKind, PatcherConfig, SubChunkQuery};

use crate::context::{ChunkContext, report_not_found};
use crate::error::Result;

/// Run the get command
///
/// Prints the sub-chunk verbatim, or a JSON object with its position.
pub fn run_get(path: &Path, query: &SubChunkQuery, json: bool, config: &PatcherConfig) -> Result<()> {
    let context = ChunkContext::open(path, config)?;
    let found = context.session().get_sub_chunk(query)?;

    if json {
        let output = match &found {
            Some(chunk) => json!({
                "found": true,
                "kind": match chunk.kind {
                    ElementKind::Block => "block",
                    ElementKind::Field => "field",
                },
                "tag": chunk.tag,
                "start": chunk.start,
                "end": chunk.end,
                "depth": chunk.depth,
                "text": chunk.text.to_text(),
            }),
            None => json!({ "found": false, "tag": query.tag }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match found {
        Some(chunk) => print!("{}", chunk.text),
        None => report_not_found(&query.tag),
    }
    Ok(())
}
