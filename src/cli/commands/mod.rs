//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod admin;
mod draw;
mod helpers;
mod init;
mod reindex;
mod search;
mod serve;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::search::DEFAULT_BATCH_SPAN;

#[derive(Parser)]
#[command(name = "brainbase")]
#[command(about = "Question base for quiz games")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    /// Can be a directory containing brainbase.db or a .db file directly.
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the HTTP API server
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(short, long, default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Draw random questions
    Random {
        /// Number of questions (default from config)
        #[arg(short = 'n', long)]
        quantity: Option<u32>,
        /// Category code or label
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Draw one random package
    Package {
        /// Category code or label
        #[arg(long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search question text
    Search {
        /// Text to look for
        text: String,
        /// Tolerate typos
        #[arg(long)]
        fuzzy: bool,
        /// Category code or label
        #[arg(long)]
        category: Option<String>,
        /// Number of results (default from config)
        #[arg(short = 'n', long)]
        quantity: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the search index from the database
    Reindex {
        /// Primary key range exported per batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SPAN)]
        batch_span: i32,
    },

    /// Show question counts
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Question maintenance (runs as administrator)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Add a question from a JSON file
    Add {
        /// JSON file with the question fields
        file: PathBuf,
        /// Publish immediately
        #[arg(long)]
        publish: bool,
    },
    /// Apply a partial update from a JSON file
    Edit {
        id: i32,
        /// JSON file with the fields to change
        file: PathBuf,
    },
    /// Change moderation flags
    Status {
        id: i32,
        /// Publish the question
        #[arg(long, conflicts_with = "unpublish")]
        publish: bool,
        /// Withdraw the question
        #[arg(long)]
        unpublish: bool,
        /// Mark the question unsuitable for release
        #[arg(long, conflicts_with = "uncondemn")]
        condemn: bool,
        /// Clear the unsuitable mark
        #[arg(long)]
        uncondemn: bool,
    },
    /// Delete a question
    Delete {
        id: i32,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Flag pair to tri-state: set, cleared, or untouched.
fn flag(set: bool, clear: bool) -> Option<bool> {
    match (set, clear) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (settings, _config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Random {
            quantity,
            category,
            json,
        } => draw::cmd_random(&settings, quantity, category.as_deref(), json).await,
        Commands::Package { category, json } => {
            draw::cmd_package(&settings, category.as_deref(), json).await
        }
        Commands::Search {
            text,
            fuzzy,
            category,
            quantity,
            json,
        } => {
            search::cmd_search(&settings, &text, fuzzy, category.as_deref(), quantity, json).await
        }
        Commands::Reindex { batch_span } => reindex::cmd_reindex(&settings, batch_span).await,
        Commands::Stats { json } => stats::cmd_stats(&settings, json).await,
        Commands::Admin { command } => match command {
            AdminCommands::Add { file, publish } => {
                admin::cmd_add(&settings, &file, publish).await
            }
            AdminCommands::Edit { id, file } => admin::cmd_edit(&settings, id, &file).await,
            AdminCommands::Status {
                id,
                publish,
                unpublish,
                condemn,
                uncondemn,
            } => {
                let status = crate::models::QuestionStatus {
                    is_published: flag(publish, unpublish),
                    is_condemned: flag(condemn, uncondemn),
                };
                admin::cmd_status(&settings, id, status).await
            }
            AdminCommands::Delete { id, yes } => admin::cmd_delete(&settings, id, yes).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "brainbase", "-v", "search", "Пушкин", "--fuzzy", "-n", "5",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Search {
                text,
                fuzzy,
                quantity,
                ..
            } => {
                assert_eq!(text, "Пушкин");
                assert!(fuzzy);
                assert_eq!(quantity, Some(5));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_status_flags_conflict() {
        assert!(Cli::try_parse_from([
            "brainbase", "admin", "status", "3", "--publish", "--unpublish"
        ])
        .is_err());
        assert_eq!(flag(false, false), None);
        assert_eq!(flag(false, true), Some(false));
    }
}
