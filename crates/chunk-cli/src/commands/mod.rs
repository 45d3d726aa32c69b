//! Command implementations for chunk-cli

pub mod field;
pub mod get;
pub mod patch;
pub mod validate;

pub use field::run_field;
pub use get::run_get;
pub use patch::{run_append, run_remove_line, run_replace};
pub use validate::run_validate;
