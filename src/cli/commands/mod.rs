//! CLI command handlers extracted from main.rs.
//!
//! Each submodule handles a top-level command variant from [`Commands`](super::Commands).

// Command handlers, not public library API.
#[allow(clippy::missing_errors_doc)]
pub mod exec;
#[allow(clippy::missing_errors_doc)]
pub mod list;
