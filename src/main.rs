mod aggregate;
mod cli;
mod csv_rows;
mod error;
mod feed;
mod fmt;
mod models;
mod session;
mod settings;
mod status_map;
mod tui;
mod upload;
mod viewer;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

const LOG_ENV: &str = "REVIEWDESK_LOG";

/// Route `tracing` output. The dashboard owns the terminal, so it logs to a
/// file; every other command logs to stderr.
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if to_file {
        let path = settings::log_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                builder.with_ansi(false).with_writer(Mutex::new(file)).init();
                return;
            }
            Err(e) => eprintln!("Warning: cannot open log file {}: {e}", path.display()),
        }
    }
    builder.with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard { source: None });

    init_logging(matches!(
        command,
        Commands::Dashboard { .. } | Commands::Upload { file: None }
    ));

    let result = match command {
        Commands::Dashboard { source } => cli::dashboard::run(source.as_deref()),
        Commands::Summary { source, json } => cli::summary::run(source.as_deref(), json),
        Commands::Records {
            source,
            sort,
            desc,
            decision,
        } => cli::records::run(source.as_deref(), &sort, desc, decision.as_deref()),
        Commands::Upload { file } => cli::upload::run(file.as_deref()),
        Commands::Csv { file, columns } => cli::csv::run(&file, &columns),
        Commands::Demo => cli::demo::run(),
        Commands::Config {
            source,
            name,
            data_dir,
        } => cli::config::run(source, name, data_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
