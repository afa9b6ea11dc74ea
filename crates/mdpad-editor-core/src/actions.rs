//! Keyboard commands and their default bindings.
//!
//! Platform code converts native key events into a [`KeyCombo`]; the
//! [`KeyBindings`] table turns combos into [`Command`]s. Keys that are not
//! bound (plain characters, navigation) are left to the platform.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::execute::EditorEvent;
use crate::text::DeleteUnit;

/// Key values for keyboard input, after platform conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key. Bindings store these lowercased.
    Character(SmolStr),
    Unidentified,
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" => Self::Escape,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            k if k.chars().count() == 1 => Self::character(k),
            _ => Self::Unidentified,
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::Character(c) => Self::Character(SmolStr::new(c.to_lowercase())),
            other => other,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Cmd on Mac, Ctrl elsewhere.
    pub fn primary(is_mac: bool) -> Self {
        if is_mac { Self::META } else { Self::CTRL }
    }

    pub fn primary_shift(is_mac: bool) -> Self {
        Self {
            shift: true,
            ..Self::primary(is_mac)
        }
    }
}

/// A key plus the modifiers held with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::NONE)
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key: key.normalized(),
            modifiers,
        }
    }

    pub fn primary(key: Key, is_mac: bool) -> Self {
        Self::with_modifiers(key, Modifiers::primary(is_mac))
    }

    pub fn primary_shift(key: Key, is_mac: bool) -> Self {
        Self::with_modifiers(key, Modifiers::primary_shift(is_mac))
    }
}

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Tab,
    Detab,
    Enter,
    Backspace(DeleteUnit),
    ForwardBackspace(DeleteUnit),
    Undo,
    Redo,
    ToggleReadOnly,
    Download,
}

impl Command {
    /// The edit event this command dispatches, for commands that edit text.
    /// Undo, redo and download are handled by the session and the platform.
    pub fn to_event(self) -> Option<EditorEvent> {
        match self {
            Command::Tab => Some(EditorEvent::Tab),
            Command::Detab => Some(EditorEvent::Detab),
            Command::Enter => Some(EditorEvent::Enter),
            Command::Backspace(unit) => Some(EditorEvent::Backspace(unit)),
            Command::ForwardBackspace(unit) => Some(EditorEvent::ForwardBackspace(unit)),
            Command::ToggleReadOnly => Some(EditorEvent::ToggleReadOnly),
            Command::Undo | Command::Redo | Command::Download => None,
        }
    }
}

/// Combo to command table.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    bindings: HashMap<KeyCombo, Command>,
}

impl KeyBindings {
    /// Default bindings for the platform.
    pub fn default_for(is_mac: bool) -> Self {
        let mut b = Self::default();
        let bs = |m: Modifiers| KeyCombo::with_modifiers(Key::Backspace, m);
        let del = |m: Modifiers| KeyCombo::with_modifiers(Key::Delete, m);

        b.bind(KeyCombo::new(Key::Tab), Command::Tab);
        b.bind(KeyCombo::with_modifiers(Key::Tab, Modifiers::SHIFT), Command::Detab);
        b.bind(KeyCombo::new(Key::Enter), Command::Enter);

        b.bind(bs(Modifiers::NONE), Command::Backspace(DeleteUnit::Rune));
        b.bind(bs(Modifiers::SHIFT), Command::Backspace(DeleteUnit::Rune));
        b.bind(del(Modifiers::NONE), Command::ForwardBackspace(DeleteUnit::Rune));
        b.bind(del(Modifiers::SHIFT), Command::ForwardBackspace(DeleteUnit::Rune));
        if is_mac {
            b.bind(bs(Modifiers::META), Command::Backspace(DeleteUnit::Paragraph));
            b.bind(bs(Modifiers::ALT), Command::Backspace(DeleteUnit::Word));
            b.bind(del(Modifiers::META), Command::ForwardBackspace(DeleteUnit::Paragraph));
            b.bind(del(Modifiers::ALT), Command::ForwardBackspace(DeleteUnit::Word));
        } else {
            b.bind(bs(Modifiers::CTRL), Command::Backspace(DeleteUnit::Word));
            b.bind(del(Modifiers::CTRL), Command::ForwardBackspace(DeleteUnit::Word));
        }

        b.bind(KeyCombo::primary(Key::character("z"), is_mac), Command::Undo);
        b.bind(KeyCombo::primary_shift(Key::character("z"), is_mac), Command::Redo);
        if !is_mac {
            b.bind(KeyCombo::primary(Key::character("y"), is_mac), Command::Redo);
        }
        b.bind(KeyCombo::primary(Key::character("p"), is_mac), Command::ToggleReadOnly);
        b.bind(KeyCombo::primary(Key::character("s"), is_mac), Command::Download);
        b
    }

    pub fn bind(&mut self, combo: KeyCombo, command: Command) {
        self.bindings.insert(combo, command);
    }

    pub fn lookup(&self, combo: &KeyCombo) -> Option<Command> {
        self.bindings.get(combo).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
