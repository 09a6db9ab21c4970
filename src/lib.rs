// jobsim library
// Terminal job search and mock interview client

pub mod cli;
pub mod client;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use client::{JobApiClient, JobBackend};
pub use core::{Config, InterviewSession, Job, ListingState, Phase};

// Error handling
pub use anyhow::{Error, Result};
