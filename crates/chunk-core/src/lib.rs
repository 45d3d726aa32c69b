//! Parsing and patching of DAW project state chunks
//!
//! The host serializes tracks, items and takes as nested, line-oriented
//! "chunks". This crate locates sub-blocks in that text, extracts, replaces
//! and removes them while reproducing every untouched byte, and commits the
//! result back to the host in one step.

pub mod config;
pub mod diff;
pub mod edit;
pub mod error;
pub mod host;
pub mod line;
pub mod patcher;
pub mod routing;
pub mod scan;
pub mod take;
pub mod text;

pub use config::PatcherConfig;
pub use diff::{ChunkDiff, LineChange};
pub use edit::{Edit, EditKind};
pub use error::{Error, HostError, Result};
pub use host::{MemoryHost, ObjectHandle, ObjectKind, ObjectStateHost, UndoBehavior};
pub use line::{LineKind, Token, quote_token, tokenize};
pub use patcher::{ChunkParserPatcher, CommitOutcome, LineFilter, SubChunk};
pub use routing::{Receive, SendMode};
pub use scan::{ChunkElement, ElementKind, Outline, SubChunkQuery};
pub use take::TakeSpan;
pub use text::ChunkText;
