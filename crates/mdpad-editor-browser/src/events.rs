//! Browser event handling for the editor.
//!
//! Turns `keydown` and `beforeinput` events into editor commands and events,
//! and tracks IME composition so native input is read back at the right time.

use mdpad_editor_core::{Command, DeleteUnit, EditorEvent, Key, KeyBindings, KeyCombo, Modifiers};

/// The key combination of a keyboard event.
pub fn key_combo(event: &web_sys::KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::from_dom_key(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// The bound command for a keydown, or `None` when the browser should handle
/// it. Keys pressed while composing always go to the IME.
pub fn handle_keydown(bindings: &KeyBindings, event: &web_sys::KeyboardEvent) -> Option<Command> {
    if event.is_composing() {
        return None;
    }
    let combo = key_combo(event);
    let command = bindings.lookup(&combo);
    if let Some(command) = command {
        tracing::trace!(target: "mdpad::dom", ?combo, ?command, "keydown bound");
    }
    command
}

/// What to do with a `beforeinput` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Prevent the default and dispatch this event.
    Edit(EditorEvent),
    Undo,
    Redo,
    /// Let the browser mutate the DOM and read it back on `input`.
    Native,
}

/// Classify a `beforeinput` by its `inputType` and `data`.
pub fn classify_beforeinput(input_type: &str, data: Option<&str>, composing: bool) -> InputAction {
    if composing {
        return InputAction::Native;
    }
    let edit = InputAction::Edit;
    match input_type {
        "insertText" => match data {
            Some(text) if !text.is_empty() => edit(EditorEvent::Write(text.to_string())),
            _ => InputAction::Native,
        },
        "insertLineBreak" | "insertParagraph" => edit(EditorEvent::Enter),
        "deleteContentBackward" => edit(EditorEvent::Backspace(DeleteUnit::Rune)),
        "deleteWordBackward" => edit(EditorEvent::Backspace(DeleteUnit::Word)),
        "deleteSoftLineBackward" | "deleteHardLineBackward" => {
            edit(EditorEvent::Backspace(DeleteUnit::Paragraph))
        }
        "deleteContentForward" => edit(EditorEvent::ForwardBackspace(DeleteUnit::Rune)),
        "deleteWordForward" => edit(EditorEvent::ForwardBackspace(DeleteUnit::Word)),
        "deleteSoftLineForward" | "deleteHardLineForward" => {
            edit(EditorEvent::ForwardBackspace(DeleteUnit::Paragraph))
        }
        "historyUndo" => InputAction::Undo,
        "historyRedo" => InputAction::Redo,
        _ => InputAction::Native,
    }
}

/// IME composition state.
///
/// While composing, `input` events are not read back. After `compositionend`
/// the composed text is read back once; the browser may follow it with an
/// `input` event for the same text, which is dropped.
#[derive(Debug, Default)]
pub struct CompositionTracker {
    composing: bool,
    last_committed: Option<String>,
}

impl CompositionTracker {
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn start(&mut self) {
        self.composing = true;
        self.last_committed = None;
    }

    /// Composition ended and `dom_text` was read back.
    pub fn end(&mut self, dom_text: String) {
        self.composing = false;
        self.last_committed = Some(dom_text);
    }

    /// Whether an `input` event whose editor text is `dom_text` must be read back.
    pub fn should_read_input(&mut self, dom_text: &str) -> bool {
        if self.composing {
            return false;
        }
        match self.last_committed.take() {
            Some(committed) if committed == dom_text => {
                tracing::trace!(target: "mdpad::dom", "dropped redundant input after composition");
                false
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_text_becomes_write() {
        assert_eq!(
            classify_beforeinput("insertText", Some("a"), false),
            InputAction::Edit(EditorEvent::Write("a".into()))
        );
        assert_eq!(
            classify_beforeinput("insertText", None, false),
            InputAction::Native
        );
    }

    #[test]
    fn test_composition_input_is_native() {
        assert_eq!(
            classify_beforeinput("insertText", Some("a"), true),
            InputAction::Native
        );
        assert_eq!(
            classify_beforeinput("insertCompositionText", Some("か"), false),
            InputAction::Native
        );
    }

    #[test]
    fn test_delete_units() {
        assert_eq!(
            classify_beforeinput("deleteWordBackward", None, false),
            InputAction::Edit(EditorEvent::Backspace(DeleteUnit::Word))
        );
        assert_eq!(
            classify_beforeinput("deleteHardLineForward", None, false),
            InputAction::Edit(EditorEvent::ForwardBackspace(DeleteUnit::Paragraph))
        );
        assert_eq!(
            classify_beforeinput("insertParagraph", None, false),
            InputAction::Edit(EditorEvent::Enter)
        );
        assert_eq!(
            classify_beforeinput("historyRedo", None, false),
            InputAction::Redo
        );
    }

    #[test]
    fn test_tracker_drops_one_redundant_input() {
        let mut tracker = CompositionTracker::default();
        tracker.start();
        assert!(!tracker.should_read_input("か"));
        tracker.end("か".to_string());
        assert!(!tracker.is_composing());
        assert!(!tracker.should_read_input("か"));
        assert!(tracker.should_read_input("か"));
    }

    #[test]
    fn test_tracker_reads_changed_input() {
        let mut tracker = CompositionTracker::default();
        tracker.start();
        tracker.end("か".to_string());
        assert!(tracker.should_read_input("かな"));
    }
}
