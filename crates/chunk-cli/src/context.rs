//! Chunk file session shared by the patch commands
//!
//! Opens a [`ChunkParserPatcher`] over a file through [`FileHost`] and, once
//! the command has made its edits, either previews or commits them.

use std::path::Path;

use colored::Colorize;

use chunk_core::{ChunkParserPatcher, CommitOutcome, PatcherConfig};

use crate::error::Result;
use crate::file_host::FileHost;

/// An open chunk file and the session editing it
#[derive(Debug)]
pub struct ChunkContext {
    host: FileHost,
    session: ChunkParserPatcher,
}

impl ChunkContext {
    pub fn open(path: &Path, config: &PatcherConfig) -> Result<Self> {
        let host = FileHost::open(path, config.max_depth)?;
        let session =
            ChunkParserPatcher::from_host(&host, host.handle())?.with_config(config.clone());
        Ok(Self { host, session })
    }

    pub fn path(&self) -> &Path {
        self.host.path()
    }

    pub fn session(&self) -> &ChunkParserPatcher {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChunkParserPatcher {
        &mut self.session
    }

    /// Print the pending changes, or write them to the file
    pub fn finish(mut self, dry_run: bool) -> Result<CommitOutcome> {
        if !self.session.is_dirty() {
            println!("{} No changes needed.", "OK".green().bold());
            return Ok(CommitOutcome::Unchanged);
        }

        if dry_run {
            print_diff(self.session.diff().unified());
            println!();
            println!("Run without {} to apply these changes.", "--dry-run".cyan());
            return Ok(CommitOutcome::Unchanged);
        }

        let diff = self.session.diff();
        let outcome = self.session.commit_default(&mut self.host)?;
        println!(
            "{} {} ({}, {})",
            "Updated".green().bold(),
            self.host.path().display().to_string().yellow(),
            format!("+{}", diff.added().count()).green(),
            format!("-{}", diff.removed().count()).red(),
        );
        Ok(outcome)
    }
}

/// Print a unified diff with added and removed lines colored
fn print_diff(unified: &str) {
    for line in unified.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}

/// Report a target that does not exist; not an error
pub fn report_not_found(what: &str) {
    println!("{} No {} found, nothing to do.", "Skipped".yellow().bold(), what);
}
