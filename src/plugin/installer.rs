use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::KeymapError;
use crate::plugin::editor::{EditorId, EditorLocator};
use crate::plugin::keymap::Keymap;

/// Writes the toggle hotkey into an editor's keymap file.
#[derive(Debug, Clone)]
pub struct HotkeyInstaller {
    locator: EditorLocator,
    host_command: String,
}

impl HotkeyInstaller {
    pub fn new(locator: EditorLocator, host_command: impl Into<String>) -> Self {
        Self {
            locator,
            host_command: host_command.into(),
        }
    }

    pub fn locator(&self) -> &EditorLocator {
        &self.locator
    }

    pub fn detect(&self) -> Option<EditorId> {
        self.locator.detect()
    }

    /// Merges the binding into the editor's keymap and returns the file path.
    /// Re-running with the same hotkey rewrites an identical document.
    pub fn install(&self, editor: EditorId, hotkey: &str) -> Result<PathBuf, KeymapError> {
        let path = self.locator.config_path_for(editor);
        let existing = read_document(&path)?;

        let mut keymap = Keymap::decode(editor.keymap_shape(), existing);
        keymap.merge_hotkey(hotkey, &self.host_command);

        let body = serde_json::to_string_pretty(&keymap.into_value()).map_err(|source| {
            KeymapError::Encode {
                path: path.clone(),
                source,
            }
        })?;

        let write_err = |source: io::Error| KeymapError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&path, body).map_err(write_err)?;

        tracing::info!(%editor, hotkey, path = %path.display(), "installed toggle hotkey");
        Ok(path)
    }
}

/// Parsed keymap, or `None` when the file is absent or not valid JSON. An
/// unparseable file is copied to `<name>.bak` first since it gets replaced.
fn read_document(path: &Path) -> Result<Option<Value>, KeymapError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(KeymapError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".bak");
            let backup = PathBuf::from(backup);
            fs::write(&backup, &raw).map_err(|source| KeymapError::Write {
                path: backup.clone(),
                source,
            })?;
            tracing::warn!(
                path = %path.display(),
                backup = %backup.display(),
                "keymap is not valid JSON ({err}), replacing it"
            );
            Ok(None)
        }
    }
}
