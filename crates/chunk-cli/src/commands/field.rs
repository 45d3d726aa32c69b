//! Field command implementation

use std::path::Path;

use colored::Colorize;

use chunk_core::{PatcherConfig, SubChunkQuery, quote_token};

use crate::context::{ChunkContext, report_not_found};
use crate::error::{CliError, Result};

/// Run the field command
///
/// Without values the field line is printed, re-quoted the way the chunk
/// stores it. With values the field is rewritten.
pub fn run_field(
    path: &Path,
    block: &SubChunkQuery,
    name: &str,
    values: &[String],
    dry_run: bool,
    config: &PatcherConfig,
) -> Result<()> {
    if values.is_empty() && dry_run {
        return Err(CliError::user("--dry-run needs values to set"));
    }
    let mut context = ChunkContext::open(path, config)?;

    if values.is_empty() {
        match context.session().get_field(block, name)? {
            Some(current) => {
                let quoted: Vec<_> = current.iter().map(|v| quote_token(v)).collect();
                println!("{} {}", name.cyan(), quoted.join(" "));
            }
            None => report_not_found(&format!("{name} field in {}", block.tag)),
        }
        return Ok(());
    }

    if !context.session_mut().set_field(block, name, values)? {
        report_not_found(&format!("{name} field in {}", block.tag));
        return Ok(());
    }
    context.finish(dry_run)?;
    Ok(())
}
