use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::core::config::ApiConfig;
use crate::core::job::{
    FeedbackRequest, FeedbackResponse, JobContext, JobPage, QuestionAnswer, QuestionsRequest,
    QuestionsResponse, SearchParams, SearchResponse,
};
use crate::core::Config;

/// The three backend operations the client consumes.
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn search_jobs(&self, params: &SearchParams) -> Result<JobPage>;

    async fn get_interview_questions(&self, job: &JobContext) -> Result<Vec<String>>;

    async fn get_feedback(&self, job: &JobContext, questions: &[QuestionAnswer])
        -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct JobApiClient {
    client: Client,
    jobs_url: Url,
    questions_url: Url,
    feedback_url: Url,
}

impl JobApiClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = api.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            jobs_url: api.endpoint(&api.jobs_path)?,
            questions_url: api.endpoint(&api.questions_path)?,
            feedback_url: api.endpoint(&api.feedback_path)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api)
    }

    async fn post_json<B, T>(&self, url: &Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        tracing::debug!("POST {} response status: {}", url.path(), status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("{} failed with status {}: {}", url.path(), status, error_text);
            return Err(anyhow!("HTTP error! status: {}", status));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse response from {}: {}", url.path(), e))
    }
}

#[async_trait]
impl JobBackend for JobApiClient {
    async fn search_jobs(&self, params: &SearchParams) -> Result<JobPage> {
        let response: SearchResponse = self
            .post_json(&self.jobs_url, params)
            .await
            .map_err(|e| {
                tracing::error!("Error fetching jobs: {:#}", e);
                e
            })?;

        match response.jobs {
            Some(jobs) => {
                let total = response.total.unwrap_or(jobs.len() as u64);
                Ok(JobPage { jobs, total })
            }
            None => {
                tracing::error!("Error fetching jobs: response has no jobs array");
                Err(anyhow!("Invalid response format"))
            }
        }
    }

    async fn get_interview_questions(&self, job: &JobContext) -> Result<Vec<String>> {
        let response: QuestionsResponse = self
            .post_json(&self.questions_url, &QuestionsRequest { job })
            .await?;

        match response.questions {
            Some(questions) if response.success => {
                tracing::debug!(
                    "Questions for '{}': {} generated, {} tech skills, total {:?}",
                    response.job_title.as_deref().unwrap_or(&job.title),
                    questions.len(),
                    response.tech_skills.len(),
                    response.total
                );
                Ok(questions)
            }
            _ => Err(anyhow!("Invalid response format from questions service")),
        }
    }

    async fn get_feedback(
        &self,
        job: &JobContext,
        questions: &[QuestionAnswer],
    ) -> Result<String> {
        let response: FeedbackResponse = self
            .post_json(&self.feedback_url, &FeedbackRequest { job, questions })
            .await?;

        match response.feedback {
            Some(feedback) if response.success => {
                tracing::debug!(
                    "Feedback for '{}' covering {} answer(s)",
                    response.job_title.as_deref().unwrap_or(&job.title),
                    questions.len()
                );
                Ok(feedback)
            }
            _ => Err(anyhow!("Invalid response format from feedback service")),
        }
    }
}
