use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a host collaborator (catalog fetch, session command).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("failed to read keymap {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write keymap {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode keymap {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a command can fail with. Rendered into user-facing lines by the
/// router; never propagated to the host.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("config missing or invalid: {0}")]
    ConfigMissingOrInvalid(#[source] ConfigError),

    #[error("failed to save config: {0}")]
    ConfigWrite(#[source] ConfigError),

    #[error("need at least three models to configure (found {found})")]
    InsufficientModels { found: usize },

    #[error("index must be 1, 2, or 3")]
    Usage { given: Option<String> },

    #[error("failed to switch to {model}: {source}")]
    RemoteActivationFailed {
        model: String,
        #[source]
        source: HostError,
    },

    #[error("failed to fetch available models: {0}")]
    RemoteCatalogFetchFailed(String),

    #[error(transparent)]
    Keymap(#[from] KeymapError),
}

impl From<ConfigError> for ToggleError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Write { .. } => Self::ConfigWrite(err),
            other => Self::ConfigMissingOrInvalid(other),
        }
    }
}
