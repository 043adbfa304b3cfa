//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor, and the configuration it is built from.
//!
//! ## Configuration Sources
//!
//! 1. Optional YAML file named by `CREDREG_CONFIG`.
//! 2. Environment overrides: `PORT`, `CREDREG_ADMIN`, `CREDREG_SNAPSHOT`.
//!
//! Bearer tokens only come from the file; they are never read from the
//! environment and are redacted from `Debug` output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use thiserror::Error;

use credreg_core::Identity;
use credreg_registry::{Ledger, LedgerSnapshot, RegistryError, SnapshotStore, StoreError};

/// A bearer token and the identity it authenticates as.
#[derive(Clone, Deserialize)]
pub struct TokenBinding {
    pub token: String,
    pub identity: Identity,
}

impl std::fmt::Debug for TokenBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBinding")
            .field("token", &"[REDACTED]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Service configuration.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Administrator for a freshly created registry. Ignored when a snapshot
    /// already exists.
    pub administrator: Option<Identity>,
    /// Snapshot file. When absent the registry lives in memory only.
    pub snapshot_path: Option<PathBuf>,
    /// Bearer tokens.
    pub tokens: Vec<TokenBinding>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("administrator", &self.administrator)
            .field("snapshot_path", &self.snapshot_path)
            .field("tokens", &format_args!("[{} REDACTED]", self.tokens.len()))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            administrator: None,
            snapshot_path: None,
            tokens: Vec::new(),
        }
    }
}

/// Errors loading configuration or bootstrapping state.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("no snapshot to resume and no administrator configured (set CREDREG_ADMIN)")]
    MissingAdministrator,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppConfig {
    /// Parse YAML configuration.
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load from `CREDREG_CONFIG` (if set) and apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os("CREDREG_CONFIG") {
            Some(path) => {
                let path = PathBuf::from(path);
                let yaml = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_yaml_str(&yaml, &path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `PORT`, `CREDREG_ADMIN` and `CREDREG_SNAPSHOT` from `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|e| ConfigError::Env {
                var: "PORT",
                reason: format!("{e}"),
            })?;
        }
        if let Some(admin) = lookup("CREDREG_ADMIN") {
            let identity = Identity::parse(&admin).map_err(|e| ConfigError::Env {
                var: "CREDREG_ADMIN",
                reason: e.to_string(),
            })?;
            self.administrator = Some(identity);
        }
        if let Some(path) = lookup("CREDREG_SNAPSHOT") {
            self.snapshot_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub config: Arc<AppConfig>,
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ledger", &self.ledger)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wrap an existing ledger, keeping whatever store it carries. No metrics
    /// exporter.
    pub fn with_ledger(ledger: Ledger, config: AppConfig) -> Self {
        Self {
            ledger: Arc::new(ledger),
            config: Arc::new(config),
            metrics: None,
        }
    }

    /// Resume from the configured snapshot, or create a fresh registry for
    /// the configured administrator.
    pub fn bootstrap(config: AppConfig) -> Result<Self, ConfigError> {
        let store = config.snapshot_path.as_ref().map(SnapshotStore::new);

        let resumed = match &store {
            Some(store) => store.load()?,
            None => None,
        };

        let snapshot = match resumed {
            Some(snapshot) => {
                tracing::info!(
                    sequence = snapshot.sequence(),
                    administrator = %snapshot.registry.administrator(),
                    "resumed registry from snapshot"
                );
                snapshot
            }
            None => {
                let admin = config.administrator.ok_or(ConfigError::MissingAdministrator)?;
                let snapshot = LedgerSnapshot::genesis(admin)?;
                if let Some(store) = &store {
                    store.save(&snapshot)?;
                }
                tracing::info!(administrator = %admin, "created new registry");
                snapshot
            }
        };

        let mut ledger = Ledger::from_snapshot(snapshot);
        if let Some(store) = store {
            ledger = ledger.with_store(Arc::new(store));
        }

        Ok(Self {
            ledger: Arc::new(ledger),
            config: Arc::new(config),
            metrics: None,
        })
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
