use std::fmt;
use std::path::PathBuf;

/// Editors whose keymap files the installer knows how to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorId {
    Zed,
    VsCode,
    Cursor,
    Windsurf,
}

/// Top-level shape of an editor's keymap document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapShape {
    /// `{ "bindings": { "<key>": <action> } }`
    Bindings,
    /// `[ { "key": ..., "command": ..., "args": ... } ]`
    EntryList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    MacOs,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Other
        }
    }
}

impl EditorId {
    /// Detection order.
    pub const PROBE_ORDER: [EditorId; 3] = [EditorId::Zed, EditorId::VsCode, EditorId::Cursor];

    pub fn name(&self) -> &'static str {
        match self {
            EditorId::Zed => "zed",
            EditorId::VsCode => "vscode",
            EditorId::Cursor => "cursor",
            EditorId::Windsurf => "windsurf",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "zed" => Some(EditorId::Zed),
            "vscode" | "code" => Some(EditorId::VsCode),
            "cursor" => Some(EditorId::Cursor),
            "windsurf" => Some(EditorId::Windsurf),
            _ => None,
        }
    }

    /// Unknown names resolve to Zed.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or(EditorId::Zed)
    }

    pub fn keymap_shape(&self) -> KeymapShape {
        match self {
            EditorId::Zed => KeymapShape::Bindings,
            EditorId::VsCode | EditorId::Cursor | EditorId::Windsurf => KeymapShape::EntryList,
        }
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves editor settings and keymap locations under a home directory.
#[derive(Debug, Clone)]
pub struct EditorLocator {
    home: PathBuf,
    os: OsFamily,
}

impl EditorLocator {
    pub fn new(home: impl Into<PathBuf>, os: OsFamily) -> Self {
        Self {
            home: home.into(),
            os,
        }
    }

    /// First editor whose settings file exists, in [`EditorId::PROBE_ORDER`].
    pub fn detect(&self) -> Option<EditorId> {
        let found = EditorId::PROBE_ORDER
            .into_iter()
            .find(|editor| self.settings_path(*editor).is_file());
        tracing::debug!(editor = ?found, "editor detection");
        found
    }

    fn settings_path(&self, editor: EditorId) -> PathBuf {
        let config = self.home.join(".config");
        match editor {
            EditorId::Zed => config.join("zed/settings.json"),
            EditorId::VsCode => config.join("Code/User/settings.json"),
            EditorId::Cursor => config.join("Cursor/User/settings.json"),
            EditorId::Windsurf => config.join("Windsurf/User/settings.json"),
        }
    }

    /// Keymap file for an editor. VS Code and Cursor live under
    /// `Library/Application Support` on macOS.
    pub fn config_path_for(&self, editor: EditorId) -> PathBuf {
        match (editor, self.os) {
            (EditorId::Zed, _) => self.home.join(".config/zed/keymap.json"),
            (EditorId::VsCode, OsFamily::MacOs) => self
                .home
                .join("Library/Application Support/Code/User/keybindings.json"),
            (EditorId::VsCode, OsFamily::Other) => {
                self.home.join(".config/Code/User/keybindings.json")
            }
            (EditorId::Cursor, OsFamily::MacOs) => self
                .home
                .join("Library/Application Support/Cursor/User/keybindings.json"),
            (EditorId::Cursor, OsFamily::Other) => {
                self.home.join(".config/Cursor/User/keybindings.json")
            }
            (EditorId::Windsurf, _) => self.home.join(".config/Windsurf/User/keybindings.json"),
        }
    }

    pub fn config_path_for_name(&self, name: &str) -> PathBuf {
        self.config_path_for(EditorId::from_name_or_default(name))
    }
}
