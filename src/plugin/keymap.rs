use serde_json::{Map, Value, json};

use crate::model::command::{COMMAND_NAME, TOGGLE_ALIAS};
use crate::plugin::editor::KeymapShape;

const TERMINAL_SEND_SEQUENCE: &str = "workbench.action.terminal.sendSequence";

/// An editor keymap document after shape validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Keymap {
    /// Object with a `bindings` map. Other top-level keys are kept as-is.
    Bindings(Map<String, Value>),
    /// Ordered list of binding entries.
    EntryList(Vec<Value>),
}

impl Keymap {
    pub fn empty(shape: KeymapShape) -> Self {
        match shape {
            KeymapShape::Bindings => {
                let mut root = Map::new();
                root.insert("bindings".to_string(), Value::Object(Map::new()));
                Keymap::Bindings(root)
            }
            KeymapShape::EntryList => Keymap::EntryList(Vec::new()),
        }
    }

    /// Accepts a parsed document if it has the shape the editor expects;
    /// anything else yields an empty keymap.
    pub fn decode(shape: KeymapShape, document: Option<Value>) -> Self {
        match (shape, document) {
            (KeymapShape::Bindings, Some(Value::Object(mut root))) => {
                if !matches!(root.get("bindings"), Some(Value::Object(_))) {
                    root.insert("bindings".to_string(), Value::Object(Map::new()));
                }
                Keymap::Bindings(root)
            }
            (KeymapShape::EntryList, Some(Value::Array(entries))) => Keymap::EntryList(entries),
            (shape, Some(_)) => {
                tracing::warn!(?shape, "keymap has an unexpected shape, starting fresh");
                Keymap::empty(shape)
            }
            (shape, None) => Keymap::empty(shape),
        }
    }

    /// Binds `hotkey` to the toggle command, replacing earlier toggle
    /// bindings. Applying it twice leaves the same document.
    pub fn merge_hotkey(&mut self, hotkey: &str, host_command: &str) {
        match self {
            Keymap::Bindings(root) => {
                let binding = json!([
                    "task::Spawn",
                    {
                        "task_name": "Model Toggle",
                        "command": host_command,
                        "args": ["run", TOGGLE_ALIAS]
                    }
                ]);
                if let Some(Value::Object(bindings)) = root.get_mut("bindings") {
                    bindings.insert(hotkey.to_string(), binding);
                }
            }
            Keymap::EntryList(entries) => {
                entries.retain(|entry| !invokes_toggle(entry));
                entries.push(json!({
                    "key": hotkey,
                    "command": TERMINAL_SEND_SEQUENCE,
                    "args": { "text": format!("{host_command} run '{TOGGLE_ALIAS}'\n") }
                }));
            }
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Keymap::Bindings(root) => Value::Object(root),
            Keymap::EntryList(entries) => Value::Array(entries),
        }
    }
}

/// Whether a list entry's `args.text` runs the toggle command or its alias.
fn invokes_toggle(entry: &Value) -> bool {
    let Some(text) = entry.pointer("/args/text").and_then(Value::as_str) else {
        return false;
    };

    let command_word = COMMAND_NAME.trim_start_matches('/');
    text.contains(command_word)
        || text
            .split_whitespace()
            .map(|word| word.trim_matches(|c| c == '\'' || c == '"'))
            .any(|word| word == TOGGLE_ALIAS)
}
