//! Taskboard
//!
//! Task, category and subtask management with a productivity dashboard:
//! - Record store adapter with field translation between entity objects and
//!   backend tables, over a remote record service or in-memory mock data
//! - Entity services with validation and cascading deletes
//! - Cached state containers with stale-load protection
//! - Pure derived views (task filters, productivity metrics)

pub mod error;
pub mod models;
pub mod notify;
pub mod records;
pub mod services;
pub mod state;
pub mod views;

use crate::notify::{NoticeBus, Notifier};
use crate::records::{HttpRecordBackend, MockRecordBackend, RecordBackend};
use crate::services::{CategoryService, StatisticService, SubtaskService, TaskService};
use crate::state::{CategoryState, EntityState, StatisticState, SubtaskState, TaskState};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "taskboard.yaml";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub backend: BackendYamlConfig,
    pub mock: MockYamlConfig,
}

/// Which record backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Mock,
    Remote,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Mock => f.write_str("mock"),
            BackendMode::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(BackendMode::Mock),
            "remote" => Ok(BackendMode::Remote),
            other => Err(format!("unknown backend mode: {other}")),
        }
    }
}

/// Backend configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BackendYamlConfig {
    pub mode: BackendMode,
    pub url: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    /// No timeout when absent
    pub timeout_secs: Option<u64>,
}

/// Mock backend section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockYamlConfig {
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Load the bundled fixtures at startup
    pub seed: bool,
}

impl Default for MockYamlConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: records::mock::DEFAULT_MIN_LATENCY_MS,
            max_latency_ms: records::mock::DEFAULT_MAX_LATENCY_MS,
            seed: true,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendMode,
    pub api_url: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub mock_min_latency_ms: u64,
    pub mock_max_latency_ms: u64,
    pub mock_seed: bool,
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|s| match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

impl Config {
    /// Equivalent to `from_yaml_and_env(None)`.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries [`DEFAULT_CONFIG_FILE`] in the working
    /// directory.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let backend = match std::env::var("TASKBOARD_BACKEND") {
            Ok(raw) => raw
                .parse()
                .map_err(anyhow::Error::msg)
                .context("invalid TASKBOARD_BACKEND")?,
            Err(_) => yaml.backend.mode,
        };

        Ok(Self {
            backend,
            api_url: std::env::var("TASKBOARD_API_URL").ok().or(yaml.backend.url),
            project_id: std::env::var("TASKBOARD_PROJECT_ID")
                .ok()
                .or(yaml.backend.project_id),
            public_key: std::env::var("TASKBOARD_PUBLIC_KEY")
                .ok()
                .or(yaml.backend.public_key),
            timeout_secs: env_parsed("TASKBOARD_TIMEOUT_SECS").or(yaml.backend.timeout_secs),
            mock_min_latency_ms: env_parsed("TASKBOARD_MOCK_MIN_LATENCY_MS")
                .unwrap_or(yaml.mock.min_latency_ms),
            mock_max_latency_ms: env_parsed("TASKBOARD_MOCK_MAX_LATENCY_MS")
                .unwrap_or(yaml.mock.max_latency_ms),
            mock_seed: env_flag("TASKBOARD_MOCK_SEED").unwrap_or(yaml.mock.seed),
        })
    }

    /// Read the YAML file, falling back to defaults when it is missing or
    /// unparsable.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let path = yaml_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let Ok(contents) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "no config file");
            return YamlConfig::default();
        };
        serde_yaml::from_str::<YamlConfig>(&contents)
            .inspect(|_| tracing::info!(path = %path.display(), "loaded config"))
            .unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config");
                YamlConfig::default()
            })
    }

    /// Build the record backend this configuration selects.
    pub fn build_backend(&self) -> Result<Arc<dyn RecordBackend>> {
        match self.backend {
            BackendMode::Mock => {
                let backend = if self.mock_seed {
                    MockRecordBackend::seeded().context("failed to load mock fixtures")?
                } else {
                    MockRecordBackend::new()
                };
                Ok(Arc::new(
                    backend.with_latency(self.mock_min_latency_ms, self.mock_max_latency_ms),
                ))
            }
            BackendMode::Remote => {
                let url = self
                    .api_url
                    .clone()
                    .filter(|u| !u.is_empty())
                    .context("remote backend requires TASKBOARD_API_URL or backend.url")?;
                let backend = HttpRecordBackend::new(
                    url,
                    self.project_id.clone(),
                    self.public_key.clone(),
                    self.timeout_secs.map(Duration::from_secs),
                )
                .context("failed to build HTTP client")?;
                Ok(Arc::new(backend))
            }
        }
    }
}

/// Shared application state
///
/// One backend, one notice bus and one service per entity, wired
/// explicitly so independent instances never share hidden state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn RecordBackend>,
    pub notices: NoticeBus,
    pub tasks: Arc<TaskService>,
    pub categories: Arc<CategoryService>,
    pub subtasks: Arc<SubtaskService>,
    pub statistics: Arc<StatisticService>,
}

impl AppState {
    /// Create application state with the backend selected by `config`
    pub fn new(config: &Config) -> Result<Self> {
        tracing::info!(backend = %config.backend, "initializing record backend");
        Ok(Self::with_backend(config.build_backend()?))
    }

    /// Create application state over an existing backend
    pub fn with_backend(backend: Arc<dyn RecordBackend>) -> Self {
        let notices = NoticeBus::default();
        let notifier: Arc<dyn Notifier> = Arc::new(notices.clone());

        Self {
            tasks: Arc::new(TaskService::new(backend.clone(), Some(notifier.clone()))),
            categories: Arc::new(CategoryService::new(backend.clone(), Some(notifier.clone()))),
            subtasks: Arc::new(SubtaskService::new(backend.clone(), Some(notifier.clone()))),
            statistics: Arc::new(StatisticService::new(backend.clone(), Some(notifier))),
            backend,
            notices,
        }
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(self.notices.clone())
    }

    /// Loaded task state container
    pub async fn task_state(&self) -> TaskState {
        EntityState::activate(self.tasks.clone(), Some(self.notifier())).await
    }

    pub async fn category_state(&self) -> CategoryState {
        EntityState::activate(self.categories.clone(), Some(self.notifier())).await
    }

    pub async fn subtask_state(&self) -> SubtaskState {
        EntityState::activate(self.subtasks.clone(), Some(self.notifier())).await
    }

    pub async fn statistic_state(&self) -> StatisticState {
        EntityState::activate(self.statistics.clone(), Some(self.notifier())).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
backend:
  mode: remote
  url: https://records.example.com/api
  project_id: proj_42
  public_key: pk_test
  timeout_secs: 15

mock:
  min_latency_ms: 10
  max_latency_ms: 20
  seed: false
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Remote);
        assert_eq!(
            config.backend.url.as_deref(),
            Some("https://records.example.com/api")
        );
        assert_eq!(config.backend.timeout_secs, Some(15));
        assert_eq!(config.mock.max_latency_ms, 20);
        assert!(!config.mock.seed);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = YamlConfig::default();
        assert_eq!(config.backend.mode, BackendMode::Mock);
        assert!(config.backend.url.is_none());
        assert!(config.backend.timeout_secs.is_none());
        assert_eq!(config.mock.min_latency_ms, 200);
        assert_eq!(config.mock.max_latency_ms, 400);
        assert!(config.mock.seed);
    }

    #[test]
    fn test_partial_yaml_keeps_section_defaults() {
        let yaml = r#"
mock:
  seed: false
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Mock);
        assert_eq!(config.mock.min_latency_ms, 200);
        assert!(!config.mock.seed);
    }

    #[test]
    fn test_unparsable_yaml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "backend: [not, a, map").unwrap();

        let config = Config::load_yaml(Some(&path));
        assert_eq!(config.backend.mode, BackendMode::Mock);
        assert_eq!(config.mock.max_latency_ms, 400);
    }

    #[test]
    fn test_backend_mode_parse() {
        assert_eq!("Remote".parse::<BackendMode>().unwrap(), BackendMode::Remote);
        assert!("sqlite".parse::<BackendMode>().is_err());
        assert_eq!(BackendMode::Mock.to_string(), "mock");
    }

    #[test]
    fn test_remote_without_url_fails() {
        let config = Config {
            backend: BackendMode::Remote,
            api_url: None,
            project_id: None,
            public_key: None,
            timeout_secs: None,
            mock_min_latency_ms: 0,
            mock_max_latency_ms: 0,
            mock_seed: false,
        };
        let err = AppState::new(&config).err().unwrap();
        assert!(err.to_string().contains("TASKBOARD_API_URL"));
    }

    #[tokio::test]
    async fn test_app_state_over_mock() {
        let config = Config {
            backend: BackendMode::Mock,
            api_url: None,
            project_id: None,
            public_key: None,
            timeout_secs: None,
            mock_min_latency_ms: 0,
            mock_max_latency_ms: 0,
            mock_seed: true,
        };
        let app = AppState::new(&config).unwrap();
        let tasks = app.task_state().await;
        let snapshot = tasks.snapshot().await;
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert!(!snapshot.items.is_empty());
    }

    /// Env vars are process-global, so every env-dependent assertion lives
    /// in this one test.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "TASKBOARD_BACKEND",
                "TASKBOARD_API_URL",
                "TASKBOARD_PROJECT_ID",
                "TASKBOARD_PUBLIC_KEY",
                "TASKBOARD_TIMEOUT_SECS",
                "TASKBOARD_MOCK_MIN_LATENCY_MS",
                "TASKBOARD_MOCK_MAX_LATENCY_MS",
                "TASKBOARD_MOCK_SEED",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
backend:
  mode: remote
  url: http://yaml-host:9000
  project_id: yaml-project
mock:
  max_latency_ms: 50
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("taskboard.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.backend, BackendMode::Remote);
        assert_eq!(config.api_url.as_deref(), Some("http://yaml-host:9000"));
        assert_eq!(config.project_id.as_deref(), Some("yaml-project"));
        assert!(config.public_key.is_none());
        assert_eq!(config.mock_max_latency_ms, 50);
        assert!(config.mock_seed);

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("TASKBOARD_BACKEND", "mock");
        std::env::set_var("TASKBOARD_API_URL", "http://env-host:9000");
        std::env::set_var("TASKBOARD_TIMEOUT_SECS", "3");
        std::env::set_var("TASKBOARD_MOCK_SEED", "false");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.backend, BackendMode::Mock);
        assert_eq!(config.api_url.as_deref(), Some("http://env-host:9000"));
        assert_eq!(config.timeout_secs, Some(3));
        assert!(!config.mock_seed);
        // YAML value still used where no env override
        assert_eq!(config.project_id.as_deref(), Some("yaml-project"));

        // --- Phase 3: Invalid mode is an error ---
        std::env::set_var("TASKBOARD_BACKEND", "carrier-pigeon");
        assert!(Config::from_yaml_and_env(Some(&file_path)).is_err());

        clear_env();

        // --- Phase 4: No YAML file → defaults ---
        let nonexistent = dir.path().join("missing.yaml");
        let config = Config::from_yaml_and_env(Some(&nonexistent)).unwrap();
        assert_eq!(config.backend, BackendMode::Mock);
        assert!(config.api_url.is_none());
        assert_eq!(config.mock_min_latency_ms, 200);
        assert!(config.timeout_secs.is_none());
    }
}
