//! Chunk CLI
//!
//! Inspect and patch DAW state chunk files from the command line.

mod cli;
mod commands;
mod context;
mod error;
mod file_host;
mod logging;

use clap::Parser;
use colored::Colorize;

use chunk_core::{LineFilter, PatcherConfig, SubChunkQuery};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => PatcherConfig::load(path)?,
        None => PatcherConfig::default(),
    };
    tracing::debug!(?config, "loaded patcher config");

    match cli.command {
        Some(cmd) => execute_command(cmd, &config),
        None => {
            println!("{} DAW state chunk tool", "chunk".green().bold());
            println!();
            println!("Run {} for available commands.", "chunk --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config: &PatcherConfig) -> Result<()> {
    match cmd {
        Commands::Validate { file } => commands::run_validate(&file, config).map(|_| ()),
        Commands::Get { file, query, json } => {
            commands::run_get(&file, &query.to_query(), json, config)
        }
        Commands::Replace {
            file,
            query,
            replacement,
            dry_run,
        } => commands::run_replace(&file, &query.to_query(), &replacement, dry_run, config),
        Commands::RemoveLine {
            file,
            block,
            field,
            block_occurrence,
            occurrence,
            contains,
            dry_run,
        } => commands::run_remove_line(
            &file,
            &block_query(&block, block_occurrence),
            &field,
            occurrence,
            &LineFilter::from(contains.as_deref()),
            dry_run,
            config,
        ),
        Commands::Append {
            file,
            block,
            lines,
            block_occurrence,
            dry_run,
        } => commands::run_append(
            &file,
            &block_query(&block, block_occurrence),
            &lines,
            dry_run,
            config,
        ),
        Commands::Field {
            file,
            block,
            name,
            values,
            block_occurrence,
            dry_run,
        } => commands::run_field(
            &file,
            &block_query(&block, block_occurrence),
            &name,
            &values,
            dry_run,
            config,
        ),
    }
}

fn block_query(tag: &str, occurrence: usize) -> SubChunkQuery {
    SubChunkQuery::new(tag).occurrence(occurrence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_query() {
        assert_eq!(
            block_query("SEND", 2),
            SubChunkQuery::new("SEND").occurrence(2)
        );
    }

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
