//! Command-line front end for project-memory.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (init, add, search, ...)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, DocumentArgs, SearchArgs};
pub use commands::{build_query, parse_time_bound, run_command};
