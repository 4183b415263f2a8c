//! Cycle a rotation of three preferred models inside a chat session.
//!
//! The host delivers chat messages to the [`MessageHandler`] returned by
//! [`initialize`]; `/m` and `/model-toggle ...` are routed to the rotation
//! stored in `~/.config/opencode/model-toggle.json`.

pub mod error;
pub mod model;
pub mod msg;
pub mod plugin;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ConfigError, HostError, KeymapError, ToggleError};
pub use model::command::Command;
pub use model::config::Settings;
pub use model::rotation::{ConfigStore, RotationConfig};
pub use msg::{ChatMessage, MessagePart, SessionId};
pub use plugin::{Catalog, Host, LogLevel, MessageHandler, PluginContext, initialize};
