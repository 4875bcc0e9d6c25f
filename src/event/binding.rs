//! Command bindings: which physical inputs produce which logical commands.
//!
//! [`CommandMap`] maps keyboard keys and gamepad buttons to [`Command`]s and
//! records which commands auto-repeat while held. The `with_defaults()`
//! constructor installs the launcher's standard layout (arrows, Enter,
//! Backspace, Escape, `r`; A/B/Start/Back and the d-pad).

use std::collections::{HashMap, HashSet};

use super::input::{pad, Command, Key, KeyEvent};

// ---------------------------------------------------------------------------
// CommandMap
// ---------------------------------------------------------------------------

/// Registry of key and button bindings plus the repeatable command set.
#[derive(Debug, Clone)]
pub struct CommandMap {
    keys: HashMap<Key, Command>,
    buttons: HashMap<u8, Command>,
    repeatable: HashSet<Command>,
}

impl CommandMap {
    /// Create an empty map. Nothing is bound and nothing repeats.
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            buttons: HashMap::new(),
            repeatable: HashSet::new(),
        }
    }

    /// Create a map with the standard bindings.
    ///
    /// Keyboard: arrows -> directions, `Enter` -> ENTER, `Backspace` -> BACK,
    /// `Escape` -> EXIT, `r` -> RELOAD. Gamepad: A/Start -> ENTER,
    /// B/Back -> BACK, d-pad -> directions. Directions repeat.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        map.bind_key(Key::Up, Command::Up);
        map.bind_key(Key::Down, Command::Down);
        map.bind_key(Key::Left, Command::Left);
        map.bind_key(Key::Right, Command::Right);
        map.bind_key(Key::Enter, Command::Enter);
        map.bind_key(Key::Backspace, Command::Back);
        map.bind_key(Key::Escape, Command::Exit);
        map.bind_key(Key::Char('r'), Command::Reload);

        map.bind_button(pad::A, Command::Enter);
        map.bind_button(pad::START, Command::Enter);
        map.bind_button(pad::B, Command::Back);
        map.bind_button(pad::BACK, Command::Back);
        map.bind_button(pad::DPAD_UP, Command::Up);
        map.bind_button(pad::DPAD_DOWN, Command::Down);
        map.bind_button(pad::DPAD_LEFT, Command::Left);
        map.bind_button(pad::DPAD_RIGHT, Command::Right);

        for command in [Command::Up, Command::Down, Command::Left, Command::Right] {
            map.set_repeatable(command, true);
        }
        map
    }

    /// Bind a key, replacing any previous binding of that key.
    pub fn bind_key(&mut self, key: Key, command: Command) {
        self.keys.insert(key, command);
    }

    /// Remove a key binding. Returns the command it produced, if any.
    pub fn unbind_key(&mut self, key: Key) -> Option<Command> {
        self.keys.remove(&key)
    }

    /// Bind a gamepad button, replacing any previous binding of that button.
    pub fn bind_button(&mut self, button: u8, command: Command) {
        self.buttons.insert(button, command);
    }

    pub fn unbind_button(&mut self, button: u8) -> Option<Command> {
        self.buttons.remove(&button)
    }

    /// Mark a command as auto-repeating while its input is held.
    pub fn set_repeatable(&mut self, command: Command, repeatable: bool) {
        if repeatable {
            self.repeatable.insert(command);
        } else {
            self.repeatable.remove(&command);
        }
    }

    pub fn is_repeatable(&self, command: Command) -> bool {
        self.repeatable.contains(&command)
    }

    /// The command for a key-down event.
    ///
    /// Returns `None` for unbound keys and for presses made while a
    /// non-lock modifier is held, which stay free for shortcuts.
    pub fn key_command(&self, event: &KeyEvent) -> Option<Command> {
        if event.modifiers.has_chord() {
            return None;
        }
        self.keys.get(&event.code).copied()
    }

    pub fn button_command(&self, button: u8) -> Option<Command> {
        self.buttons.get(&button).copied()
    }

    /// Number of key and button bindings.
    pub fn len(&self) -> usize {
        self.keys.len() + self.buttons.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.buttons.is_empty()
    }
}

impl Default for CommandMap {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
