use clap::Parser;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use jobsim::cli::handlers;
use jobsim::cli::{Cli, Commands};
use jobsim::utils::tui_writer::{LogEntry, TuiWriter};
use jobsim::{Config, Result};

fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive("jobsim=info".parse()?))
}

/// Route logs away from stdout while the TUI owns the terminal.
fn init_tui_tracing(logfile: Option<&Path>) -> Result<tokio::sync::mpsc::UnboundedReceiver<LogEntry>> {
    let (tui_writer, log_rx) = TuiWriter::new();

    match logfile {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter()?)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter()?)
                .with_ansi(false)
                .with_writer(tui_writer)
                .init();
        }
    }

    Ok(log_rx)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Browse);

    let log_rx = match command {
        Commands::Browse => Some(init_tui_tracing(cli.logfile.as_deref())?),
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter()?)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    };

    let file_config = Config::load_file()?;
    let config = file_config.with_overrides(cli.api_url.as_deref());
    // Fail fast on a bad base URL before any view is shown
    config.api.endpoint(&config.api.jobs_path)?;

    match command {
        Commands::Browse => {
            let (_, empty_rx) = tokio::sync::mpsc::unbounded_channel();
            handlers::browse(config, log_rx.unwrap_or(empty_rx)).await
        }
        Commands::Search {
            query,
            level,
            job_type,
            limit,
        } => handlers::search(config, query, level, job_type, limit).await,
        Commands::Questions { query, pick } => handlers::questions(config, query, pick).await,
        Commands::Config { init } => handlers::show_config(&file_config, &config, init),
    }
}
