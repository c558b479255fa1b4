//! Keyboard shortcuts for the timeline editor.
//!
//! Keys are identified by name ("Space", "S", "Delete", ...) with an optional
//! `Cmd+` prefix; Cmd stands for Ctrl on Windows/Linux and Command on macOS.
//! Every shortcut is suppressed while a text input has keyboard focus.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    TogglePlayPause,
    Stop,
    Deselect,
    SplitAtPlayhead,
    DuplicateSelected,
    DeleteSelected,
    ZoomIn,
    ZoomOut,
}

#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: HashMap<String, EditorCommand>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self { bindings: HashMap::new() };
        map.setup_default_bindings();
        map
    }
}

impl KeyMap {
    #[cfg(test)]
    fn empty() -> Self {
        Self { bindings: HashMap::new() }
    }

    fn setup_default_bindings(&mut self) {
        use EditorCommand::*;

        self.bind("Space", TogglePlayPause);
        self.bind("Escape", Deselect);
        self.bind("S", SplitAtPlayhead);
        self.bind("Cmd+D", DuplicateSelected);
        self.bind("Delete", DeleteSelected);
        self.bind("Backspace", DeleteSelected);
        self.bind("Cmd+Equals", ZoomIn);
        self.bind("Cmd+Plus", ZoomIn);
        self.bind("Cmd+Minus", ZoomOut);
    }

    pub fn bind(&mut self, combo: &str, command: EditorCommand) {
        self.bindings.insert(combo.to_string(), command);
    }

    #[cfg(test)]
    fn unbind(&mut self, combo: &str) {
        self.bindings.remove(combo);
    }

    /// Resolve a key press. `command` is the platform command modifier.
    pub fn handle_key(
        &self,
        key: &str,
        command: bool,
        text_input_focused: bool,
    ) -> Option<EditorCommand> {
        if text_input_focused {
            return None;
        }
        let combo = if command { format!("Cmd+{key}") } else { key.to_string() };
        self.bindings.get(&combo).copied()
    }
}
