use std::sync::Arc;

use crate::client::{JobApiClient, JobBackend, JobsTui};
use crate::core::description::{format_first_seen, truncate_description};
use crate::core::listing::filter_by_job_type;
use crate::core::{Filter, SearchParams};
use crate::utils::tui_writer::LogEntry;
use crate::{Config, Result};

pub async fn browse(config: Config, log_rx: tokio::sync::mpsc::UnboundedReceiver<LogEntry>) -> Result<()> {
    tracing::info!("Using backend at {}", config.api.base_url);
    let backend: Arc<dyn JobBackend> = Arc::new(JobApiClient::from_config(&config)?);

    let mut tui = JobsTui::new()?;
    tui.run(backend, &config, log_rx).await
}

pub async fn search(
    config: Config,
    query: String,
    level: Option<String>,
    job_type: Option<String>,
    limit: Option<u32>,
) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Search query must not be blank");
    }

    let client = JobApiClient::from_config(&config)?;
    let params = SearchParams {
        query: query.trim().to_string(),
        limit: Some(limit.unwrap_or(config.search.page_size)),
        tech_skills: None,
        job_level: level,
    };
    let page = client.search_jobs(&params).await?;

    let filter = job_type.map(Filter::Only).unwrap_or_default();
    let visible = filter_by_job_type(&page.jobs, &filter);

    println!(
        "Showing {} of {} jobs for \"{}\"",
        visible.len(),
        page.total,
        params.query
    );
    for (i, job) in visible.iter().enumerate() {
        println!(
            "{:>2}. {} at {} [{} | {}] {}",
            i + 1,
            job.title,
            job.company,
            job.job_type,
            job.job_level,
            format_first_seen(&job.first_seen)
        );
        println!("    {}", job.location);
        println!("    {}", truncate_description(&job.description, 120));
    }
    Ok(())
}

pub async fn questions(config: Config, query: String, pick: usize) -> Result<()> {
    let client = JobApiClient::from_config(&config)?;
    let params = SearchParams {
        query: query.trim().to_string(),
        limit: Some(config.search.page_size),
        ..Default::default()
    };
    let page = client.search_jobs(&params).await?;

    let job = pick
        .checked_sub(1)
        .and_then(|index| page.jobs.get(index))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No job #{} in results for \"{}\" ({} returned)",
                pick,
                params.query,
                page.jobs.len()
            )
        })?;

    println!("Interview questions for {} at {}:", job.title, job.company);
    let questions = client.get_interview_questions(&job.context()).await?;
    for (i, question) in questions.iter().enumerate() {
        println!("{:>2}. {}", i + 1, question);
    }
    Ok(())
}

/// Print the effective config. `--init` writes only what came from the file
/// (or defaults), never the one-off env / CLI base URL overrides.
pub fn show_config(file_config: &Config, config: &Config, init: bool) -> Result<()> {
    if init {
        let path = file_config.save()?;
        println!("# written to {}", path.display());
    } else if let Some(path) = Config::config_file() {
        println!("# {}", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
