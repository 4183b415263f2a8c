use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULTS: &str = include_str!("../../config/default.toml");

/// Plugin settings. These configure the plugin itself; the rotation lives in
/// its own JSON file owned by [`ConfigStore`](crate::model::rotation::ConfigStore).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub general: GeneralConfig,
    pub rotation: RotationSettings,
    pub hotkey: HotkeyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub log_filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotationSettings {
    pub config_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotkeyConfig {
    pub key: String,
    pub install_on_setup: bool,
    pub host_command: String,
    #[serde(default)]
    pub editor: Option<String>,
}

impl Settings {
    /// Load settings with layering: defaults → per-user settings file, when
    /// there is one.
    pub fn load() -> Result<Self> {
        let user_path = directories::ProjectDirs::from("", "", "model-toggle")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .filter(|path| path.exists());

        match user_path {
            Some(path) => Self::load_from(&path),
            None => Self::from_layers(None, &home_dir()?),
        }
    }

    /// Defaults layered with an explicit settings file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let user = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_layers(Some(&user), &home_dir()?)
    }

    /// Deep-merges `user` over the embedded defaults and expands `~` against
    /// `home`.
    pub fn from_layers(user: Option<&str>, home: &Path) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;

        if let Some(user) = user {
            let overlay: toml::Table = toml::from_str(user).context("invalid settings file")?;
            merge_tables(&mut merged, overlay);
        }

        let mut settings: Settings = toml::Value::Table(merged).try_into()?;
        settings.rotation.config_path = expand_tilde(&settings.rotation.config_path, home);
        settings.hotkey.editor = settings
            .hotkey
            .editor
            .take()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(settings)
    }

    pub fn rotation_path(&self) -> PathBuf {
        PathBuf::from(&self.rotation.config_path)
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn expand_tilde(path: &str, home: &Path) -> String {
    if !path.starts_with('~') {
        return path.to_string();
    }
    path.replacen('~', &home.to_string_lossy(), 1)
}

fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))
}
