//! Campus Console
//!
//! Admin console core for the Campus learning platform:
//! - Moderation workflow for student registrations (approve / reject / bulk)
//! - Snapshot store over the backend API with event-driven invalidation
//! - Dashboard analytics derived from fetched snapshots
//! - Activity feed, leaderboard and progress views
//! - In-memory filtering for the fetched collections

pub mod analytics;
pub mod backend;
pub mod events;
pub mod filter;
pub mod moderation;
pub mod records;
pub mod session;
pub mod store;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use backend::{HttpRecordSource, RecordSource};
use events::EventBus;
use moderation::ModerationEngine;
use session::SessionContext;
use store::SnapshotStore;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub backend: BackendYamlConfig,
    pub session: SessionYamlConfig,
}

/// Backend configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendYamlConfig {
    pub base_url: String,
}

impl Default for BackendYamlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".into(),
        }
    }
}

/// Session configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionYamlConfig {
    /// Admin bearer token; when absent the console starts signed out
    pub token: Option<String>,
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub admin_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);

        // 2. Build Config with env var overrides
        Ok(Self {
            backend_url: std::env::var("CAMPUS_BACKEND_URL").unwrap_or(yaml.backend.base_url),
            admin_token: std::env::var("CAMPUS_ADMIN_TOKEN")
                .ok()
                .or(yaml.session.token),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Console assembly
// ============================================================================

/// Shared console state
///
/// One backend source, one snapshot store and one event bus, wired so
/// applied moderation outcomes invalidate the cached student snapshot.
#[derive(Clone)]
pub struct AdminConsole {
    pub config: Arc<Config>,
    pub session: Arc<SessionContext>,
    pub source: Arc<dyn RecordSource>,
    pub store: Arc<SnapshotStore>,
    pub moderation: Arc<ModerationEngine>,
    pub events: EventBus,
}

impl AdminConsole {
    /// Wire the console against the HTTP backend.
    ///
    /// Must be called inside the tokio runtime: the store's invalidation
    /// listener task is spawned here.
    pub fn new(config: Config) -> Self {
        let session = Arc::new(match &config.admin_token {
            Some(token) => SessionContext::with_credential(token.clone()),
            None => SessionContext::new(),
        });
        let source: Arc<dyn RecordSource> =
            Arc::new(HttpRecordSource::new(&config.backend_url, session.clone()));
        Self::assemble(Arc::new(config), session, source)
    }

    /// Wire the console over any record source; used by embedders and
    /// tests that substitute the HTTP adapter.
    pub fn with_source(config: Config, source: Arc<dyn RecordSource>) -> Self {
        let session = Arc::new(match &config.admin_token {
            Some(token) => SessionContext::with_credential(token.clone()),
            None => SessionContext::new(),
        });
        Self::assemble(Arc::new(config), session, source)
    }

    fn assemble(
        config: Arc<Config>,
        session: Arc<SessionContext>,
        source: Arc<dyn RecordSource>,
    ) -> Self {
        let events = EventBus::default();
        let store = Arc::new(SnapshotStore::new(source.clone()));
        store.spawn_invalidation_listener(&events);
        let moderation = Arc::new(ModerationEngine::new(
            source.clone(),
            Arc::new(events.clone()),
        ));
        Self {
            config,
            session,
            source,
            store,
            moderation,
            events,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
