use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "offline-queue")]
#[command(about = "Inspect and manage an offline operations queue")]
#[command(long_about = "offline-queue - Inspect and manage an offline operations queue

Local changes to remote-tracked entities are recorded as pending operations,
compacted to at most one per entity, until they are replayed against the
remote. This tool reads and maintains that queue.

QUICK START:
  offline-queue status                  Show queue counts
  offline-queue list --limit 10         Show the next operations to replay
  offline-queue show <TRANSACTION_ID>   Show one operation with its snapshot

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Path to the queue database
    #[arg(long, global = true, env = "OFFLINE_QUEUE_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show queue statistics
    ///
    /// Displays the number of queued adds, replaces and deletes, and the age
    /// of the oldest queued operation.
    #[command(alias = "st")]
    Status,

    /// List queued operations in replay order
    #[command(alias = "ls")]
    List {
        /// Only show operations for this entity type
        #[arg(long, short = 't')]
        entity_type: Option<String>,

        /// Maximum operations to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show a queued operation with its snapshot
    Show {
        /// Transaction ID of the operation
        id: Uuid,
    },

    /// Remove a queued operation
    ///
    /// The change it recorded will never reach the remote.
    #[command(alias = "rm")]
    Remove {
        /// Transaction ID of the operation
        id: Uuid,
    },

    /// Remove every queued operation
    Clear {
        /// Required confirmation
        #[arg(long)]
        force: bool,
    },

    /// List synchronization bookmarks
    Bookmarks,
}
