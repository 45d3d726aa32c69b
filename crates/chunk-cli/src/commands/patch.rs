//! Replace, remove-line and append commands
//!
//! Each command opens the file, applies one edit and hands the session to
//! [`ChunkContext::finish`]. A missing target is reported and leaves the file
//! untouched.

use std::path::Path;

use chunk_core::{ChunkText, LineFilter, PatcherConfig, SubChunkQuery};

use crate::context::{ChunkContext, report_not_found};
use crate::error::{CliError, Result};

/// Run the replace command
pub fn run_replace(
    path: &Path,
    query: &SubChunkQuery,
    replacement: &Path,
    dry_run: bool,
    config: &PatcherConfig,
) -> Result<()> {
    let content =
        std::fs::read_to_string(replacement).map_err(|e| CliError::file(replacement, e))?;
    let new_content = ChunkText::load(&content)?;

    let mut context = ChunkContext::open(path, config)?;
    if !context.session_mut().replace_sub_chunk(query, &new_content)? {
        report_not_found(&query.tag);
        return Ok(());
    }
    context.finish(dry_run)?;
    Ok(())
}

/// Run the remove-line command
pub fn run_remove_line(
    path: &Path,
    block: &SubChunkQuery,
    field: &str,
    field_occurrence: usize,
    filter: &LineFilter,
    dry_run: bool,
    config: &PatcherConfig,
) -> Result<()> {
    let mut context = ChunkContext::open(path, config)?;
    if !context
        .session_mut()
        .remove_line(block, field, field_occurrence, filter)?
    {
        report_not_found(&format!("{field} line in {}", block.tag));
        return Ok(());
    }
    context.finish(dry_run)?;
    Ok(())
}

/// Run the append command
pub fn run_append(
    path: &Path,
    block: &SubChunkQuery,
    lines: &[String],
    dry_run: bool,
    config: &PatcherConfig,
) -> Result<()> {
    let mut context = ChunkContext::open(path, config)?;
    if !context.session_mut().append_to_block(block, lines)? {
        report_not_found(&format!("{} block", block.tag));
        return Ok(());
    }
    context.finish(dry_run)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TRACK: &str = "<TRACK\n  NAME x\n  <SEND\n    DEST 1\n  >\n  <SEND\n    DEST 2\n  >\n>\n";

    fn write_track(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("track.chunk");
        fs::write(&path, TRACK).unwrap();
        path
    }

    #[test]
    fn test_replace_second_send() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir);
        let replacement = dir.path().join("send.chunk");
        fs::write(&replacement, "  <SEND\n    DEST 7\n  >\n").unwrap();

        let query = SubChunkQuery::new("SEND").occurrence(1);
        run_replace(&path, &query, &replacement, false, &PatcherConfig::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("DEST 1"));
        assert!(content.contains("DEST 7"));
        assert!(!content.contains("DEST 2"));
    }

    #[test]
    fn test_replace_missing_target_is_ok() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir);
        let replacement = dir.path().join("send.chunk");
        fs::write(&replacement, "<SEND\n>\n").unwrap();

        let query = SubChunkQuery::new("SEND").occurrence(5);
        run_replace(&path, &query, &replacement, false, &PatcherConfig::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TRACK);
    }

    #[test]
    fn test_remove_line_dry_run() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir);
        run_remove_line(
            &path,
            &SubChunkQuery::new("SEND"),
            "DEST",
            0,
            &LineFilter::Any,
            true,
            &PatcherConfig::default(),
        )
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TRACK);
    }

    #[test]
    fn test_append_to_track() {
        let dir = TempDir::new().unwrap();
        let path = write_track(&dir);
        run_append(
            &path,
            &SubChunkQuery::new("TRACK"),
            &["  MUTESOLO 1 0 0".to_string()],
            false,
            &PatcherConfig::default(),
        )
        .unwrap();
        assert!(
            fs::read_to_string(&path)
                .unwrap()
                .ends_with("  >\n  MUTESOLO 1 0 0\n>\n")
        );
    }
}
