pub mod config;
pub mod csv;
pub mod dashboard;
pub mod demo;
pub mod records;
pub mod summary;
pub mod upload;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::models::Record;
use crate::settings::load_settings;

/// Resolve the feed from `--source` or settings and load it, propagating errors.
pub(crate) fn load_from(source: Option<&str>) -> Result<Vec<Record>> {
    let source = load_settings().resolve_source(source);
    crate::feed::load_records(&source)
}

#[derive(Parser)]
#[command(name = "reviewdesk", about = "Terminal dashboard for document-review records.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (default).
    Dashboard {
        /// Record feed: URL or path to a JSON file
        #[arg(long)]
        source: Option<String>,
    },
    /// Print totals, the monthly rejection series and the histograms.
    Summary {
        /// Record feed: URL or path to a JSON file
        #[arg(long)]
        source: Option<String>,
        /// Print the chart datasets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the record table.
    Records {
        /// Record feed: URL or path to a JSON file
        #[arg(long)]
        source: Option<String>,
        /// Sort column: id, account, upload-date, completion-date, status,
        /// category, issue, reason, decision
        #[arg(long, default_value = "id")]
        sort: String,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Only show records with this decision: Pending, Accept or Reject
        #[arg(long)]
        decision: Option<String>,
    },
    /// Simulate uploading a document. Without FILE, opens the drop screen.
    Upload {
        /// JPG, PNG or PDF file
        file: Option<String>,
    },
    /// Parse a CSV file and print its rows as JSON.
    Csv {
        /// Path to a CSV file with a header row
        file: String,
        /// Only output these columns (repeatable)
        #[arg(long = "column")]
        columns: Vec<String>,
    },
    /// Write a generated sample dataset and point settings at it.
    Demo,
    /// Show or update settings.
    Config {
        /// Default record feed (URL or path); pass "" to reset
        #[arg(long)]
        source: Option<String>,
        /// Your name, shown in the dashboard greeting
        #[arg(long)]
        name: Option<String>,
        /// Data directory for the generated sample dataset
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
}
