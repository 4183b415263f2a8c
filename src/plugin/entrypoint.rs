use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::model::command::Command;
use crate::model::config::{HotkeyConfig, Settings};
use crate::model::rotation::ConfigStore;
use crate::msg::ChatMessage;
use crate::plugin::editor::{EditorLocator, OsFamily};
use crate::plugin::host::{Catalog, Host, LogLevel};
use crate::plugin::installer::HotkeyInstaller;
use crate::plugin::router::CommandRouter;

/// Everything the plugin needs besides the host.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub store: ConfigStore,
    pub installer: HotkeyInstaller,
    pub hotkey: HotkeyConfig,
}

impl PluginContext {
    pub fn from_settings(settings: &Settings, home: &Path, os: OsFamily) -> Self {
        Self {
            store: ConfigStore::new(settings.rotation_path()),
            installer: HotkeyInstaller::new(
                EditorLocator::new(home, os),
                settings.hotkey.host_command.clone(),
            ),
            hotkey: settings.hotkey.clone(),
        }
    }
}

/// Boots the plugin: best-effort catalog fetch, then make sure a rotation
/// file exists. Nothing in here can keep the handler from being returned.
pub fn initialize<H: Host>(host: H, context: PluginContext) -> MessageHandler<H> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| bootstrap(&host, &context.store)));
    if outcome.is_err() {
        host.log(LogLevel::Error, "model-toggle bootstrap panicked");
    }

    MessageHandler { host, context }
}

fn bootstrap(host: &impl Host, store: &ConfigStore) {
    let catalog = match Catalog::fetch(host) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            host.log(LogLevel::Warn, "Unable to fetch model list for defaults");
            host.log(LogLevel::Warn, &err.to_string());
            None
        }
    };

    match store.ensure_exists(catalog.as_ref().map(Catalog::models)) {
        Ok(true) => host.log(
            LogLevel::Info,
            &format!("created {}", store.path().display()),
        ),
        Ok(false) => {}
        Err(err) => host.log(LogLevel::Warn, &err.to_string()),
    }
}

/// The single inbound chat message hook.
pub struct MessageHandler<H: Host> {
    host: H,
    context: PluginContext,
}

impl<H: Host> MessageHandler<H> {
    /// Handles one message and returns the lines to show. Messages that are
    /// not commands yield nothing. Never panics back into the host.
    pub fn handle(&self, message: &ChatMessage) -> Vec<String> {
        let text = message.command_text();
        if text.is_empty() || !Command::is_command(&text) {
            return Vec::new();
        }

        let command = Command::parse(&text);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            CommandRouter::new(
                &self.host,
                &self.context.store,
                &self.context.installer,
                &self.context.hotkey,
            )
            .execute(&command, &message.session_id)
        }));

        outcome.unwrap_or_else(|_| {
            self.host.log(
                LogLevel::Error,
                &format!("{} command panicked", command.label()),
            );
            vec!["Model toggle failed unexpectedly, see the log for details".to_string()]
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }
}
