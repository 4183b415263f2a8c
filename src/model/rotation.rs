use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ToggleError};

/// Number of slots in a rotation.
pub const ROTATION_LEN: usize = 3;

/// Schema version written into every config file.
pub const CONFIG_VERSION: &str = "1.0.0";

/// The persisted rotation: three model ids and the active slot.
///
/// Construction always goes through validation, so `current_index` is
/// guaranteed to be below [`ROTATION_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRotationConfig")]
pub struct RotationConfig {
    models: [String; ROTATION_LEN],
    current_index: usize,
    version: String,
}

/// Unvalidated on-disk shape.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRotationConfig {
    models: Vec<String>,
    current_index: i64,
    version: String,
}

impl TryFrom<RawRotationConfig> for RotationConfig {
    type Error = String;

    fn try_from(raw: RawRotationConfig) -> Result<Self, Self::Error> {
        let found = raw.models.len();
        let models: [String; ROTATION_LEN] = raw
            .models
            .try_into()
            .map_err(|_| format!("expected {ROTATION_LEN} models, found {found}"))?;

        let current_index = usize::try_from(raw.current_index)
            .ok()
            .filter(|idx| *idx < ROTATION_LEN)
            .ok_or_else(|| format!("currentIndex {} out of range 0-2", raw.current_index))?;

        Ok(Self {
            models,
            current_index,
            version: raw.version,
        })
    }
}

impl RotationConfig {
    /// Builds the default rotation from the first three candidates, raw and in
    /// order (no deduplication).
    pub fn build_default(candidates: &[String]) -> Result<Self, ToggleError> {
        match candidates {
            [first, second, third, ..] => Ok(Self {
                models: [first.clone(), second.clone(), third.clone()],
                current_index: 0,
                version: CONFIG_VERSION.to_string(),
            }),
            _ => Err(ToggleError::InsufficientModels {
                found: candidates.len(),
            }),
        }
    }

    pub fn models(&self) -> &[String; ROTATION_LEN] {
        &self.models
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based slot number of the active model.
    pub fn position(&self) -> usize {
        self.current_index + 1
    }

    pub fn current_model(&self) -> &str {
        &self.models[self.current_index]
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Advances to the next slot, wrapping after the last one.
    pub fn toggle(&mut self) -> &str {
        self.current_index = (self.current_index + 1) % ROTATION_LEN;
        self.current_model()
    }

    /// Selects a 0-based slot. Returns `None` and leaves the rotation alone when
    /// the slot does not exist.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if index >= ROTATION_LEN {
            return None;
        }
        self.current_index = index;
        Some(self.current_model())
    }

    /// Rows for `show`: `→ 2. model (active)` for the active slot.
    pub fn render_slots(&self) -> Vec<String> {
        self.models
            .iter()
            .enumerate()
            .map(|(idx, model)| {
                if idx == self.current_index {
                    format!("→ {}. {model} (active)", idx + 1)
                } else {
                    format!("  {}. {model}", idx + 1)
                }
            })
            .collect()
    }
}

/// Sole owner of the rotation file on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and validates the rotation. Never repairs a broken file.
    pub fn load(&self) -> Result<RotationConfig, ConfigError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::Missing {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the file with the full config. Writes a sibling temp file and
    /// renames it over the target so a reader never sees a partial document.
    pub fn save(&self, config: &RotationConfig) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let body = serde_json::to_string_pretty(config)
            .map_err(|err| write_err(io::Error::new(io::ErrorKind::InvalidData, err)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body).map_err(write_err)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(err));
        }

        tracing::debug!(path = %self.path.display(), index = config.current_index(), "rotation saved");
        Ok(())
    }

    /// Writes a default rotation when no file exists and enough candidates are
    /// known. Returns whether a file was created. Too few candidates is not an
    /// error: the plugin simply stays unconfigured until setup or reset.
    pub fn ensure_exists(&self, candidates: Option<&[String]>) -> Result<bool, ConfigError> {
        if self.exists() {
            return Ok(false);
        }

        let Some(config) = candidates.and_then(|c| RotationConfig::build_default(c).ok()) else {
            tracing::info!(path = %self.path.display(), "no rotation config and too few models to create one");
            return Ok(false);
        };

        self.save(&config)?;
        tracing::info!(path = %self.path.display(), "created default rotation config");
        Ok(true)
    }
}
