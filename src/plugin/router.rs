use crate::error::ToggleError;
use crate::model::command::Command;
use crate::model::config::HotkeyConfig;
use crate::model::rotation::{ConfigStore, ROTATION_LEN, RotationConfig};
use crate::msg::SessionId;
use crate::plugin::editor::EditorId;
use crate::plugin::host::{Catalog, Host, LogLevel};
use crate::plugin::installer::HotkeyInstaller;

const SETUP_HINT: &str = "Run /model-toggle setup to configure";
const RECONFIGURE_HINT: &str = "Run /model-toggle setup to reconfigure";
const SET_USAGE: &str = "Usage: /model-toggle set <1|2|3>";

/// Executes parsed commands against the rotation file and the host.
pub struct CommandRouter<'a, H: Host> {
    host: &'a H,
    store: &'a ConfigStore,
    installer: &'a HotkeyInstaller,
    hotkey: &'a HotkeyConfig,
}

impl<'a, H: Host> CommandRouter<'a, H> {
    pub fn new(
        host: &'a H,
        store: &'a ConfigStore,
        installer: &'a HotkeyInstaller,
        hotkey: &'a HotkeyConfig,
    ) -> Self {
        Self {
            host,
            store,
            installer,
            hotkey,
        }
    }

    /// Runs a command and returns the lines to show the user. Failures are
    /// rendered, never returned.
    pub fn execute(&self, command: &Command, session: &SessionId) -> Vec<String> {
        tracing::debug!(command = command.label(), session = session.as_str(), "dispatch");

        let result = match command {
            Command::Toggle => self.activate(session, |config| Some(config.toggle().to_string())),
            Command::Set(arg) => parse_slot(arg.as_deref()).and_then(|index| {
                self.activate(session, |config| config.select(index).map(ToString::to_string))
            }),
            Command::Show => self.show(),
            Command::Setup => self.setup(),
            Command::Reset => self.reset(),
        };

        result.unwrap_or_else(|err| self.report(command, &err))
    }

    /// Applies `transition` to a copy of the rotation, activates the new model
    /// on the host and persists only once the host accepted it.
    fn activate(
        &self,
        session: &SessionId,
        transition: impl FnOnce(&mut RotationConfig) -> Option<String>,
    ) -> Result<Vec<String>, ToggleError> {
        let mut config = self.store.load()?;
        let Some(model) = transition(&mut config) else {
            return Err(ToggleError::Usage { given: None });
        };

        self.host
            .set_session_model(session, &model)
            .map_err(|source| ToggleError::RemoteActivationFailed {
                model: model.clone(),
                source,
            })?;

        self.store.save(&config)?;

        let line = format!("→ {model} [{}/{ROTATION_LEN}]", config.position());
        self.host.log(LogLevel::Info, &line);
        Ok(vec![line])
    }

    fn show(&self) -> Result<Vec<String>, ToggleError> {
        let config = self.store.load()?;

        let mut lines = vec!["Model Rotation:".to_string()];
        lines.extend(config.render_slots());
        lines.push(String::new());
        lines.push("Use /m to cycle through models".to_string());
        Ok(lines)
    }

    fn setup(&self) -> Result<Vec<String>, ToggleError> {
        let catalog = Catalog::fetch(self.host)?;
        if catalog.is_empty() {
            return Ok(vec!["No models returned from the host".to_string()]);
        }

        let mut lines = vec!["Model Toggle Setup".to_string(), String::new()];
        lines.push("Available models:".to_string());
        lines.extend(
            catalog
                .models()
                .iter()
                .enumerate()
                .map(|(idx, model)| format!("  {}. {model}", idx + 1)),
        );
        lines.push(String::new());
        lines.push(format!("Edit {} to choose your rotation:", self.store.path().display()));
        lines.push(format!(
            "set the \"models\" array to your {ROTATION_LEN} preferred models"
        ));
        lines.push(String::new());
        lines.extend(self.hotkey_lines());
        Ok(lines)
    }

    fn hotkey_lines(&self) -> Vec<String> {
        let mut lines = vec!["Editor Hotkey Setup".to_string()];

        let configured = self.hotkey.editor.as_deref().map(EditorId::from_name_or_default);
        let detected = configured.or_else(|| self.installer.detect());
        if let Some(editor) = detected {
            lines.push(format!("Detected: {editor}"));
        }

        if let (Some(editor), true) = (detected, self.hotkey.install_on_setup) {
            match self.installer.install(editor, &self.hotkey.key) {
                Ok(path) => {
                    lines.push(format!(
                        "✓ Bound {} in {}",
                        self.hotkey.key,
                        path.display()
                    ));
                    return lines;
                }
                Err(err) => {
                    self.host.log(LogLevel::Warn, &err.to_string());
                    lines.push(format!("Could not install hotkey: {err}"));
                }
            }
        }

        let editor = detected.unwrap_or(EditorId::Zed);
        lines.push("Add this hotkey to your editor config:".to_string());
        lines.push(format!("Editor: {editor}"));
        lines.push(format!(
            "Config: {}",
            self.installer.locator().config_path_for(editor).display()
        ));
        lines.push(format!("Hotkey: {}", self.hotkey.key));
        lines
    }

    fn reset(&self) -> Result<Vec<String>, ToggleError> {
        let catalog = Catalog::fetch(self.host)?;
        let config = RotationConfig::build_default(catalog.models())?;
        self.store.save(&config)?;

        self.host
            .log(LogLevel::Info, "rotation reset to the first three available models");
        Ok(vec!["✓ Configuration reset to defaults".to_string()])
    }

    fn report(&self, command: &Command, err: &ToggleError) -> Vec<String> {
        let level = match err {
            ToggleError::Usage { .. } | ToggleError::InsufficientModels { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        };
        self.host
            .log(level, &format!("{} failed: {err}", command.label()));

        match err {
            ToggleError::ConfigMissingOrInvalid(source) => vec![
                "Config missing or invalid".to_string(),
                source.to_string(),
                SETUP_HINT.to_string(),
            ],
            ToggleError::Usage { .. } => {
                vec![format!("Error: {err}"), SET_USAGE.to_string()]
            }
            ToggleError::RemoteActivationFailed { .. } => {
                vec![err.to_string(), RECONFIGURE_HINT.to_string()]
            }
            ToggleError::InsufficientModels { .. } => vec![
                "Need at least three models to reset config".to_string(),
                err.to_string(),
            ],
            ToggleError::RemoteCatalogFetchFailed(message) => vec![
                "Failed to fetch available models".to_string(),
                message.clone(),
            ],
            ToggleError::ConfigWrite(_) | ToggleError::Keymap(_) => vec![format!("Error: {err}")],
        }
    }
}

/// Parses a 1-based slot argument into a 0-based index.
fn parse_slot(arg: Option<&str>) -> Result<usize, ToggleError> {
    arg.and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|slot| (1..=ROTATION_LEN).contains(slot))
        .map(|slot| slot - 1)
        .ok_or_else(|| ToggleError::Usage {
            given: arg.map(ToString::to_string),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::Settings;
    use crate::plugin::editor::{EditorLocator, OsFamily};
    use crate::testing::FakeHost;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        home: TempDir,
        store: ConfigStore,
        installer: HotkeyInstaller,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let home = TempDir::new().unwrap();
            let settings = Settings::from_layers(None, home.path()).unwrap();
            let store = ConfigStore::new(settings.rotation_path());
            let installer =
                HotkeyInstaller::new(EditorLocator::new(home.path(), OsFamily::Other), "opencode");
            Self {
                home,
                store,
                installer,
                settings,
            }
        }

        fn with_rotation(self, models: [&str; 3], index: usize) -> Self {
            let candidates: Vec<String> = models.iter().map(|m| m.to_string()).collect();
            let mut config = RotationConfig::build_default(&candidates).unwrap();
            config.select(index).unwrap();
            self.store.save(&config).unwrap();
            self
        }

        fn run(&self, host: &FakeHost, command: Command) -> Vec<String> {
            CommandRouter::new(host, &self.store, &self.installer, &self.settings.hotkey)
                .execute(&command, &SessionId::new("sess-1"))
        }

        fn raw(&self) -> String {
            fs::read_to_string(self.store.path()).unwrap()
        }
    }

    #[test]
    fn test_toggle_activates_next_and_persists() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 0);
        let host = FakeHost::with_models(&["a", "b", "c"]);

        let lines = fx.run(&host, Command::Toggle);

        assert_eq!(lines, vec!["→ b [2/3]"]);
        assert_eq!(host.activations(), vec![("sess-1".to_string(), "b".to_string())]);
        assert_eq!(fx.store.load().unwrap().current_index(), 1);
    }

    #[test]
    fn test_three_toggles_come_back_around() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 2);
        let host = FakeHost::with_models(&[]);
        for _ in 0..3 {
            fx.run(&host, Command::Toggle);
        }
        assert_eq!(fx.store.load().unwrap().current_index(), 2);
        let models: Vec<String> = host.activations().into_iter().map(|(_, m)| m).collect();
        assert_eq!(models, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failed_activation_leaves_file_untouched() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 0);
        let before = fx.raw();
        let host = FakeHost::with_models(&[]).failing_activation("session gone");

        for command in [Command::Toggle, Command::Set(Some("3".to_string()))] {
            let lines = fx.run(&host, command);
            assert!(lines[0].starts_with("failed to switch to "), "{lines:?}");
            assert!(lines[0].ends_with("session gone"));
            assert_eq!(lines[1], RECONFIGURE_HINT);
            assert_eq!(fx.raw(), before);
        }
    }

    #[test]
    fn test_set_selects_slot() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 0);
        let host = FakeHost::with_models(&[]);
        for (arg, expected) in [("1", 0), ("2", 1), ("3", 2)] {
            let lines = fx.run(&host, Command::Set(Some(arg.to_string())));
            assert_eq!(lines[0], format!("→ {} [{}/3]", ["a", "b", "c"][expected], expected + 1));
            assert_eq!(fx.store.load().unwrap().current_index(), expected);
        }
    }

    #[test]
    fn test_set_rejects_bad_slots_without_touching_anything() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 1);
        let before = fx.raw();
        let host = FakeHost::with_models(&[]);

        for arg in [Some("5"), Some("0"), Some("-1"), Some("two"), Some("1.5"), None] {
            let lines = fx.run(&host, Command::Set(arg.map(ToString::to_string)));
            assert_eq!(lines, vec!["Error: index must be 1, 2, or 3", SET_USAGE]);
            assert_eq!(fx.raw(), before);
        }
        assert!(host.activations().is_empty());
    }

    #[test]
    fn test_missing_config_hints_setup() {
        let fx = Fixture::new();
        let host = FakeHost::with_models(&[]);
        let lines = fx.run(&host, Command::Toggle);
        assert_eq!(lines[0], "Config missing or invalid");
        assert_eq!(lines[2], SETUP_HINT);
        assert!(host.activations().is_empty());
        assert!(!fx.store.exists());
    }

    #[test]
    fn test_show_marks_active_slot() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 2);
        let before = fx.raw();
        let lines = fx.run(&FakeHost::with_models(&[]), Command::Show);
        assert_eq!(lines[0], "Model Rotation:");
        assert_eq!(&lines[1..4], ["  1. a", "  2. b", "→ 3. c (active)"]);
        assert_eq!(fx.raw(), before);
    }

    #[test]
    fn test_reset_overwrites_customized_rotation() {
        let fx = Fixture::new().with_rotation(["mine", "also-mine", "custom"], 2);
        let host = FakeHost::with_models(&["x", "y", "z", "w"]);

        let lines = fx.run(&host, Command::Reset);

        assert_eq!(lines, vec!["✓ Configuration reset to defaults"]);
        let config = fx.store.load().unwrap();
        assert_eq!(config.models(), &["x", "y", "z"].map(String::from));
        assert_eq!(config.current_index(), 0);
    }

    #[test]
    fn test_reset_needs_three_models() {
        let fx = Fixture::new().with_rotation(["a", "b", "c"], 1);
        let before = fx.raw();
        let lines = fx.run(&FakeHost::with_models(&["x", "y"]), Command::Reset);
        assert_eq!(lines[0], "Need at least three models to reset config");
        assert_eq!(fx.raw(), before);
    }

    #[test]
    fn test_reset_reports_catalog_failure() {
        let fx = Fixture::new();
        let host = FakeHost::with_models(&[]).failing_catalog("offline");
        let lines = fx.run(&host, Command::Reset);
        assert_eq!(lines, vec!["Failed to fetch available models", "offline"]);
        assert!(!fx.store.exists());
    }

    #[test]
    fn test_setup_lists_catalog_and_installs_hotkey() {
        let fx = Fixture::new();
        let zed_settings = fx.home.path().join(".config/zed/settings.json");
        fs::create_dir_all(zed_settings.parent().unwrap()).unwrap();
        fs::write(&zed_settings, "{}").unwrap();

        let lines = fx.run(&FakeHost::with_models(&["m1", "m2"]), Command::Setup);

        assert!(lines.contains(&"  1. m1".to_string()));
        assert!(lines.contains(&"  2. m2".to_string()));
        assert!(lines.contains(&"Detected: zed".to_string()));
        assert!(lines.last().unwrap().starts_with("✓ Bound cmd+shift+m in "));
        assert!(fx.home.path().join(".config/zed/keymap.json").is_file());
    }

    #[test]
    fn test_setup_without_editor_prints_manual_steps() {
        let fx = Fixture::new();
        let lines = fx.run(&FakeHost::with_models(&["m1"]), Command::Setup);
        assert!(lines.contains(&"Editor: zed".to_string()));
        assert!(lines.contains(&"Hotkey: cmd+shift+m".to_string()));
        assert!(!fx.home.path().join(".config/zed/keymap.json").exists());
    }

    #[test]
    fn test_setup_reports_catalog_failure() {
        let fx = Fixture::new();
        let host = FakeHost::with_models(&[]).failing_catalog("offline");
        let lines = fx.run(&host, Command::Setup);
        assert_eq!(lines, vec!["Failed to fetch available models", "offline"]);
        assert!(!fx.home.path().join(".config/zed/keymap.json").exists());
    }

    #[test]
    fn test_setup_reports_empty_catalog() {
        let fx = Fixture::new();
        let lines = fx.run(&FakeHost::with_models(&[]), Command::Setup);
        assert_eq!(lines, vec!["No models returned from the host"]);
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot(Some("1")).unwrap(), 0);
        assert_eq!(parse_slot(Some(" 3 ")).unwrap(), 2);
        assert!(parse_slot(Some("4")).is_err());
        assert!(parse_slot(None).is_err());
    }
}
