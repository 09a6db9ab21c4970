use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::interview::DEFAULT_ADVANCE_DELAY;
use super::listing::{DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE, DEFAULT_QUERY};

/// Environment override for the backend base URL
pub const API_BASE_URL_ENV: &str = "JOBSIM_API_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub interview: InterviewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub jobs_path: String,
    pub questions_path: String,
    pub feedback_path: String,
    /// Per-request timeout; unset means requests may wait indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            jobs_path: "/jobs".to_string(),
            questions_path: "/questions".to_string(),
            feedback_path: "/feedback".to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Join an endpoint path onto the base URL, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid API base URL '{}'", self.base_url))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("API base URL '{}' cannot be a base", self.base_url));
        }

        let mut url = base.clone();
        let prefix = base.path().trim_end_matches('/');
        url.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
        Ok(url)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_query: String,
    pub page_size: u32,
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_query: DEFAULT_QUERY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    pub advance_delay_ms: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            advance_delay_ms: DEFAULT_ADVANCE_DELAY.as_millis() as u64,
        }
    }
}

impl InterviewConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "jobsim", "jobsim")
}

impl Config {
    pub fn config_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the config file, or defaults when there is none. No overrides applied.
    pub fn load_file() -> Result<Self> {
        match Self::config_file() {
            Some(config_file) if config_file.exists() => {
                let content = std::fs::read_to_string(&config_file)
                    .with_context(|| format!("Failed to read {}", config_file.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Failed to parse {}", config_file.display()))
            }
            _ => Ok(Config::default()),
        }
    }

    /// Copy of this config with `JOBSIM_API_BASE_URL` and then `cli_base_url` applied.
    pub fn with_overrides(&self, cli_base_url: Option<&str>) -> Self {
        let env_base_url = std::env::var(API_BASE_URL_ENV).ok();
        if env_base_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
            tracing::debug!("Using API base URL from {}", API_BASE_URL_ENV);
        }
        self.with_base_url_overrides(env_base_url.as_deref(), cli_base_url)
    }

    fn with_base_url_overrides(&self, env_base_url: Option<&str>, cli_base_url: Option<&str>) -> Self {
        let mut config = self.clone();
        for base_url in [env_base_url, cli_base_url].into_iter().flatten() {
            if !base_url.trim().is_empty() {
                config.api.base_url = base_url.trim().to_string();
            }
        }
        config
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_file =
            Self::config_file().ok_or_else(|| anyhow!("No config directory available"))?;
        self.save_to(&config_file)?;
        Ok(config_file)
    }

    pub fn save_to(&self, config_file: &Path) -> Result<()> {
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_file, self.to_toml()?)?;
        tracing::info!("Wrote config to {}", config_file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            base_url = "https://jobs.example.com/api"

            [search]
            page_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://jobs.example.com/api");
        assert_eq!(config.api.jobs_path, "/jobs");
        assert_eq!(config.search.page_size, 10);
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.interview.advance_delay_ms, 500);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = ApiConfig {
            base_url: "https://jobs.example.com/api/".to_string(),
            ..Default::default()
        };

        assert_eq!(
            api.endpoint("/questions").unwrap().as_str(),
            "https://jobs.example.com/api/questions"
        );
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let api = ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };

        assert!(api.endpoint("/jobs").is_err());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = Config::default();
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_cli_override_wins_over_env() {
        let file = Config::default();
        let config = file.with_base_url_overrides(
            Some("http://env.example.com"),
            Some(" http://cli.example.com "),
        );

        assert_eq!(config.api.base_url, "http://cli.example.com");
        assert_eq!(file.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let file = Config::default();
        let config = file.with_base_url_overrides(Some("  "), None);
        assert_eq!(config, file);
    }

    #[test]
    fn test_saved_file_keeps_base_url_without_overrides() {
        let file = Config::from_toml("[api]\nbase_url = \"https://jobs.example.com\"\n").unwrap();
        let effective = file.with_base_url_overrides(None, Some("http://127.0.0.1:9999"));
        assert_eq!(effective.api.base_url, "http://127.0.0.1:9999");

        let path = std::env::temp_dir()
            .join(format!("jobsim-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        file.save_to(&path).unwrap();
        let saved = Config::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();

        assert_eq!(saved.api.base_url, "https://jobs.example.com");
    }
}
