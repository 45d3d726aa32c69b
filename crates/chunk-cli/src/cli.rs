//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use chunk_core::SubChunkQuery;

/// Inspect and patch DAW state chunk files
#[derive(Parser, Debug)]
#[command(name = "chunk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Patcher settings (TOML)
    #[arg(long, global = true, env = "CHUNK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where to look for a sub-chunk
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct QueryArgs {
    /// Block tag or field name to look for
    pub tag: String,

    /// Which match to use, counting from 0
    #[arg(short, long, default_value_t = 0)]
    pub occurrence: usize,

    /// Line to start scanning at, counting from 0
    #[arg(long = "from", default_value_t = 0, value_name = "LINE")]
    pub from_line: usize,

    /// Only match inside a block with this tag
    #[arg(long, value_name = "TAG")]
    pub within: Option<String>,

    /// Stop scanning at the first block with this tag
    #[arg(long, value_name = "TAG")]
    pub stop_at: Option<String>,
}

impl QueryArgs {
    pub fn to_query(&self) -> SubChunkQuery {
        let mut query = SubChunkQuery::new(self.tag.as_str())
            .occurrence(self.occurrence)
            .from_line(self.from_line);
        if let Some(ancestor) = &self.within {
            query = query.within(ancestor.as_str());
        }
        if let Some(stop) = &self.stop_at {
            query = query.stop_at(stop.as_str());
        }
        query
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check that a file is a well-formed chunk
    Validate {
        /// Chunk file
        file: PathBuf,
    },

    /// Print a sub-chunk
    ///
    /// Examples:
    ///   chunk get track.txt SEND --occurrence 1
    ///   chunk get item.txt SOURCE --within TAKE --json
    Get {
        /// Chunk file
        file: PathBuf,

        #[command(flatten)]
        query: QueryArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Replace a sub-chunk with the contents of another file
    Replace {
        /// Chunk file
        file: PathBuf,

        #[command(flatten)]
        query: QueryArgs,

        /// File holding the replacement lines
        #[arg(long = "with", value_name = "FILE")]
        replacement: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove one field line from a block
    RemoveLine {
        /// Chunk file
        file: PathBuf,

        /// Tag of the enclosing block
        block: String,

        /// Field name of the line to remove
        field: String,

        /// Which block with that tag, counting from 0
        #[arg(long, default_value_t = 0)]
        block_occurrence: usize,

        /// Which matching line in the block, counting from 0
        #[arg(short, long, default_value_t = 0)]
        occurrence: usize,

        /// Only consider lines containing this text
        #[arg(long, value_name = "TEXT")]
        contains: Option<String>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Append lines to the end of a block
    Append {
        /// Chunk file
        file: PathBuf,

        /// Tag of the block
        block: String,

        /// Lines to insert before the block's closing marker
        #[arg(required = true)]
        lines: Vec<String>,

        /// Which block with that tag, counting from 0
        #[arg(long, default_value_t = 0)]
        block_occurrence: usize,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a field of a block, or set it when values are given
    Field {
        /// Chunk file
        file: PathBuf,

        /// Tag of the block
        block: String,

        /// Field name
        name: String,

        /// New values
        values: Vec<String>,

        /// Which block with that tag, counting from 0
        #[arg(long, default_value_t = 0)]
        block_occurrence: usize,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_get_with_query_options() {
        let cli = Cli::parse_from([
            "chunk", "get", "t.txt", "SOURCE", "--occurrence", "2", "--within", "ITEM", "--json",
        ]);
        let Some(Commands::Get { file, query, json }) = cli.command else {
            panic!("expected get command");
        };
        assert_eq!(file, PathBuf::from("t.txt"));
        assert!(json);
        assert_eq!(
            query.to_query(),
            SubChunkQuery::new("SOURCE").occurrence(2).within("ITEM")
        );
    }

    #[test]
    fn parse_remove_line() {
        let cli = Cli::parse_from([
            "chunk",
            "remove-line",
            "i.txt",
            "TAKE",
            "FILE",
            "--contains",
            "a.wav",
            "--dry-run",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::RemoveLine {
                file: PathBuf::from("i.txt"),
                block: "TAKE".into(),
                field: "FILE".into(),
                block_occurrence: 0,
                occurrence: 0,
                contains: Some("a.wav".into()),
                dry_run: true,
            })
        );
    }

    #[test]
    fn append_requires_lines() {
        assert!(Cli::try_parse_from(["chunk", "append", "t.txt", "TRACK"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["chunk", "validate", "t.txt", "-v", "--config", "c.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
