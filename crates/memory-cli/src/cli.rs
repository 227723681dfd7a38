//! CLI argument parsing for the memory binary.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use memory_types::{DocType, Priority};

/// Project Memory
///
/// Per-project keyword index for notes, decisions, rules and dependency records.
#[derive(Parser, Debug)]
#[command(name = "memory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/project-memory/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Project root whose index to use
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load (or create) the project's index and report its state
    Init,

    /// Add a document
    Add {
        /// Document body
        content: String,

        #[command(flatten)]
        fields: DocumentArgs,
    },

    /// Show a document by id
    Get {
        id: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace an existing document; the original timestamp is kept
    Update {
        id: String,

        /// New document body
        content: String,

        #[command(flatten)]
        fields: DocumentArgs,
    },

    /// Delete a document by id
    Delete { id: String },

    /// Search documents
    Search(SearchArgs),

    /// List all documents of one type, newest first
    List {
        #[arg(short = 't', long = "type", value_parser = parse_doc_type)]
        doc_type: DocType,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-index every stored document
    Rebuild,

    /// Show index statistics
    Stats {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

/// Document fields shared by `add` and `update`
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Document type (note, decision, rule, dependency)
    #[arg(short = 't', long = "type", default_value = "note", value_parser = parse_doc_type)]
    pub doc_type: DocType,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Priority (low, medium, high)
    #[arg(long, default_value = "medium", value_parser = parse_priority)]
    pub priority: Priority,

    #[arg(long, default_value = "")]
    pub category: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, default_value = "manual")]
    pub source: String,
}

/// Search arguments
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text query; omit for filter-only search
    #[arg(default_value = "")]
    pub query: String,

    #[arg(short = 't', long = "type", value_parser = parse_doc_type)]
    pub doc_type: Option<DocType>,

    /// Required tag (repeatable; all must match)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub category: Option<String>,

    /// Earliest timestamp (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Latest timestamp (RFC 3339 or YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub until: Option<String>,

    /// Maximum results (default from config)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Print JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_doc_type(s: &str) -> Result<DocType, String> {
    s.parse()
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse()
}
