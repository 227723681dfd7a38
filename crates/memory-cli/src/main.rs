//! Project Memory CLI
//!
//! # Usage
//!
//! ```bash
//! memory [--project DIR] init
//! memory add "Use thiserror in library crates" --type decision --tag errors
//! memory search "error handling" --type decision
//! memory search --priority high
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/project-memory/config.toml)
//! 3. Environment variables (MEMORY_*)
//! 4. CLI flags

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use memory_cli::{run_command, Cli};
use memory_service::IndexRegistry;
use memory_types::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let project = if cli.project.is_absolute() {
        cli.project.clone()
    } else {
        std::env::current_dir()
            .context("Failed to resolve current directory")?
            .join(&cli.project)
    };

    let registry = IndexRegistry::new(settings);
    registry
        .initialize(&project)
        .with_context(|| format!("Failed to initialize index for {}", project.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&registry, &project, cli.command, &mut out)
}
