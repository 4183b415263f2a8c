use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{HostError, ToggleError};
use crate::msg::SessionId;

/// Log severity forwarded to the host's log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Capabilities the plugin needs from the chat runtime.
///
/// Calls are synchronous; a slow host simply delays the response.
pub trait Host {
    /// Raw provider catalog payload, decoded by [`Catalog::decode`].
    fn providers(&self) -> Result<Value, HostError>;

    /// Switches the active model of a session.
    fn set_session_model(&self, session: &SessionId, model: &str) -> Result<(), HostError>;

    /// Log sink. Defaults to `tracing` events.
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Flattened, deduplicated model ids in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    models: Vec<String>,
}

#[derive(Deserialize)]
struct Provider {
    #[serde(default)]
    models: Option<serde_json::Map<String, Value>>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

impl Catalog {
    /// Accepts `{data: {providers}}` or `{providers}`. A `null` or missing
    /// list counts as empty, and a provider or model that does not decode is
    /// skipped without affecting the rest.
    pub fn decode(payload: Value) -> Result<Self, ToggleError> {
        let unexpected = |what: &str| {
            ToggleError::RemoteCatalogFetchFailed(format!("unexpected provider payload: {what}"))
        };

        let mut root = match payload {
            Value::Object(mut root) => match root.remove("data") {
                Some(Value::Object(data)) => data,
                Some(Value::Null) | None => root,
                Some(_) => return Err(unexpected("`data` is not an object")),
            },
            _ => return Err(unexpected("expected an object")),
        };

        let providers = match root.remove("providers") {
            Some(Value::Array(providers)) => providers,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(unexpected("`providers` is not a list")),
        };

        let mut seen = HashSet::new();
        let models = providers
            .into_iter()
            .filter_map(|provider| serde_json::from_value::<Provider>(provider).ok())
            .flat_map(|provider| provider.models.unwrap_or_default().into_iter())
            .map(|(_, entry)| entry)
            .filter_map(|entry| serde_json::from_value::<ModelEntry>(entry).ok())
            .map(|entry| entry.id)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        Ok(Self { models })
    }

    /// Fetches and decodes the catalog in one step.
    pub fn fetch(host: &impl Host) -> Result<Self, ToggleError> {
        let payload = host
            .providers()
            .map_err(|err| ToggleError::RemoteCatalogFetchFailed(err.to_string()))?;
        Self::decode(payload)
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
