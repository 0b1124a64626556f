// src/config.rs
//! Client configuration: optional YAML file, environment overrides, defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::core::{Endpoints, FsOps, Timeouts};
use crate::types::Country;

pub const DEFAULT_BASE_URL: &str = "https://web-production-0b80c.up.railway.app";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_DATA_DIR: &str = "gradhire-data";
const DEFAULT_WATCHDOG_SECS: u64 = 30;
const STAGED_RESUME_FILE: &str = "staged_resume.pdf";
const BOOKMARKS_FILE: &str = "bookmarks.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: String,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub country: Country,
    pub timeouts: Timeouts,
    pub upload_watchdog: Duration,
    pub optimize_watchdog: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ConfigSection,
    #[serde(default)]
    production: ConfigSection,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigSection {
    base_url: Option<String>,
    data_dir: Option<PathBuf>,
    country: Option<String>,
    #[serde(default)]
    timeouts: TimeoutSection,
    #[serde(default)]
    watchdog: WatchdogSection,
}

#[derive(Debug, Default, Deserialize)]
struct TimeoutSection {
    upload_seconds: Option<u64>,
    jobs_seconds: Option<u64>,
    optimize_seconds: Option<u64>,
    download_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WatchdogSection {
    upload_seconds: Option<u64>,
    optimize_seconds: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            country: Country::default(),
            timeouts: Timeouts::default(),
            upload_watchdog: Duration::from_secs(DEFAULT_WATCHDOG_SECS),
            optimize_watchdog: Duration::from_secs(DEFAULT_WATCHDOG_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration for the current environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let explicit = std::env::var("GRADHIRE_CONFIG").ok();
        let config_path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml_str(&content, &environment)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else if explicit.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        } else {
            Self {
                environment: environment.clone(),
                ..Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.data_dir = resolve_path(&config.data_dir)?;
        config.validate()?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("GRADHIRE_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Build from YAML with `local` and `production` sections.
    pub fn from_yaml_str(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).context("Invalid YAML")?;
        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        let defaults = Self::default();
        let timeouts = Timeouts {
            upload: secs_or(section.timeouts.upload_seconds, defaults.timeouts.upload),
            jobs: secs_or(section.timeouts.jobs_seconds, defaults.timeouts.jobs),
            optimize: secs_or(section.timeouts.optimize_seconds, defaults.timeouts.optimize),
            download: secs_or(section.timeouts.download_seconds, defaults.timeouts.download),
        };
        let country = match section.country {
            Some(code) => Country::parse(&code)?,
            None => defaults.country,
        };

        Ok(Self {
            environment: environment.to_string(),
            base_url: section.base_url.unwrap_or(defaults.base_url),
            data_dir: section.data_dir.unwrap_or(defaults.data_dir),
            country,
            timeouts,
            upload_watchdog: secs_or(section.watchdog.upload_seconds, defaults.upload_watchdog),
            optimize_watchdog: secs_or(
                section.watchdog.optimize_seconds,
                defaults.optimize_watchdog,
            ),
        })
    }

    /// Apply `GRADHIRE_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GRADHIRE_API_URL") {
            self.base_url = url;
        }
        if let Some(dir) = lookup("GRADHIRE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(code) = lookup("GRADHIRE_COUNTRY") {
            self.country = Country::parse(&code)
                .with_context(|| format!("GRADHIRE_COUNTRY is invalid: {}", code))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        Endpoints::new(&self.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.base_url))?;

        let durations = [
            ("timeouts.upload_seconds", self.timeouts.upload),
            ("timeouts.jobs_seconds", self.timeouts.jobs),
            ("timeouts.optimize_seconds", self.timeouts.optimize),
            ("timeouts.download_seconds", self.timeouts.download),
            ("watchdog.upload_seconds", self.upload_watchdog),
            ("watchdog.optimize_seconds", self.optimize_watchdog),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }
        Ok(())
    }

    pub fn download_dir(&self) -> PathBuf {
        self.data_dir.join("downloads")
    }

    pub fn resume_dir(&self) -> PathBuf {
        self.data_dir.join("resumes")
    }

    /// Fixed location the picked résumé is copied to before upload.
    pub fn staged_resume_path(&self) -> PathBuf {
        self.resume_dir().join(STAGED_RESUME_FILE)
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        self.data_dir.join(BOOKMARKS_FILE)
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [self.data_dir.clone(), self.download_dir(), self.resume_dir()] {
            FsOps::ensure_dir_exists(&dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

fn secs_or(value: Option<u64>, default: Duration) -> Duration {
    value.map(Duration::from_secs).unwrap_or(default)
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
local:
  base_url: "http://127.0.0.1:8000"
  data_dir: "/tmp/gradhire"
  country: "us"
  timeouts:
    jobs_seconds: 90
  watchdog:
    upload_seconds: 10
production:
  base_url: "https://api.gradhire.example"
"#;

    #[test]
    fn test_local_section() {
        let config = ClientConfig::from_yaml_str(SAMPLE, "local").unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gradhire"));
        assert_eq!(config.country.code(), "us");
        assert_eq!(config.timeouts.jobs, Duration::from_secs(90));
        assert_eq!(config.timeouts.upload, Duration::from_secs(20));
        assert_eq!(config.upload_watchdog, Duration::from_secs(10));
        assert_eq!(config.optimize_watchdog, Duration::from_secs(30));
    }

    #[test]
    fn test_production_section_falls_back_to_defaults() {
        let config = ClientConfig::from_yaml_str(SAMPLE, "production").unwrap();
        assert_eq!(config.base_url, "https://api.gradhire.example");
        assert_eq!(config.country.code(), "in");
        assert_eq!(config.timeouts, Timeouts::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GRADHIRE_API_URL", "http://10.0.0.2:9000"),
            ("GRADHIRE_COUNTRY", "US"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.country.code(), "us");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_country_in_env() {
        let mut config = ClientConfig::default();
        let result = config.apply_env(|key| {
            (key == "GRADHIRE_COUNTRY").then(|| "india".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.base_url = "nope".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.timeouts.optimize = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_paths() {
        let mut config = ClientConfig::default();
        config.data_dir = PathBuf::from("/data");
        assert_eq!(config.download_dir(), PathBuf::from("/data/downloads"));
        assert_eq!(
            config.staged_resume_path(),
            PathBuf::from("/data/resumes/staged_resume.pdf")
        );
        assert_eq!(config.bookmarks_path(), PathBuf::from("/data/bookmarks.json"));
    }

    #[tokio::test]
    async fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.data_dir = dir.path().join("nested");
        config.ensure_directories().await.unwrap();
        assert!(config.download_dir().is_dir());
        assert!(config.resume_dir().is_dir());
    }
}
