use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobsim")]
#[command(about = "Search tech jobs and rehearse interviews from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config file and JOBSIM_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Path to write logs to instead of the TUI status line
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Browse jobs and run interview simulations (default)
    Browse,
    /// Search jobs and print the results
    Search {
        /// Search query, e.g. "data scientist"
        query: String,
        /// Experience level sent to the server, e.g. "Senior"
        #[arg(short, long)]
        level: Option<String>,
        /// Only show jobs of this type (remote, hybrid, onsite)
        #[arg(short = 't', long)]
        job_type: Option<String>,
        /// Number of jobs to request
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print the interview questions generated for a job from a search
    Questions {
        /// Search query used to find the job
        query: String,
        /// Which result to use (1-based)
        #[arg(short, long, default_value = "1")]
        pick: usize,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}
