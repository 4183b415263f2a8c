pub mod editor;
pub mod entrypoint;
pub mod host;
pub mod installer;
pub mod keymap;
pub mod router;

pub use entrypoint::{MessageHandler, PluginContext, initialize};
pub use host::{Catalog, Host, LogLevel};
