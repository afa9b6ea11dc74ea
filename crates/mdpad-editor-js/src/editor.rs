//! JsEditor - the main editor wrapper for JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use mdpad_editor_browser::clipboard::{
    clipboard_text, download, set_clipboard_text, write_clipboard_text,
};
use mdpad_editor_browser::events::handle_keydown as keydown_command;
use mdpad_editor_browser::{
    BrowserError, Command, CompositionTracker, Debouncer, Editor, EditorConfig, EditorEvent,
    EditorView, InputAction, KeyBindings, LineId, Outcome, classify_beforeinput, platform,
    storage,
};
use wasm_bindgen::prelude::*;
use web_sys::{
    ClipboardEvent, CompositionEvent, HtmlElement, InputEvent, KeyboardEvent, MouseEvent,
};
use web_time::Instant;

use crate::types::{OutlineEntry, config_from_js};

/// Editor state shared with timer callbacks.
struct Session {
    editor: Editor,
    view: Option<EditorView>,
    bindings: KeyBindings,
    composition: CompositionTracker,
    /// Addressable range captured before a native edit.
    pending_range: Option<Vec<LineId>>,
    storage_key: String,
}

impl Session {
    fn sync_selection(&mut self) -> Result<(), BrowserError> {
        if let Some(view) = &self.view {
            view.sync_selection(&mut self.editor)?;
        }
        Ok(())
    }

    fn show(&self, outcome: &Outcome) -> Result<(), BrowserError> {
        match &self.view {
            Some(view) => view.apply(&self.editor, outcome),
            None => Ok(()),
        }
    }

    fn render(&self) -> Result<(), BrowserError> {
        if let Some(view) = &self.view {
            view.render(&self.editor)?;
        }
        Ok(())
    }

    fn dom_text(&self) -> String {
        self.view
            .as_ref()
            .map(EditorView::text_content)
            .unwrap_or_default()
    }

    /// Remember the lines a native edit may touch. The first capture wins
    /// until the edit is read back.
    fn capture_range(&mut self) -> Result<(), BrowserError> {
        if self.pending_range.is_none() {
            self.sync_selection()?;
            self.pending_range = Some(self.editor.addressable_range());
        }
        Ok(())
    }

    fn read_back(&mut self) -> Result<Outcome, BrowserError> {
        let range = self
            .pending_range
            .take()
            .unwrap_or_else(|| self.editor.addressable_range());
        let Some(view) = &self.view else {
            return Ok(Outcome::default());
        };
        let outcome = view.read_back(&mut self.editor, &range, Instant::now())?;
        view.apply(&self.editor, &outcome)?;
        Ok(outcome)
    }

    fn persist(&self) {
        if let Err(err) = storage::save(&self.storage_key, &self.editor.text()) {
            tracing::warn!(target: "mdpad::dom", %err, "could not save document");
        }
    }
}

/// The editor instance exposed to JavaScript.
///
/// The host forwards the editor element's DOM events to the `handle*`
/// methods; each returns after the DOM and caret are up to date.
#[wasm_bindgen]
pub struct JsEditor {
    session: Rc<RefCell<Session>>,
    flush: Debouncer,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor from the stored document (or the default one).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsError> {
        let config = config_from_js(config)?;
        let text = storage::load(&config.storage_key());
        Ok(Self::build(&text, config))
    }

    /// Create an editor from markdown content.
    #[wasm_bindgen(js_name = fromMarkdown)]
    pub fn from_markdown(content: &str, config: JsValue) -> Result<JsEditor, JsError> {
        let config = config_from_js(config)?;
        Ok(Self::build(content, config))
    }

    /// Take over `element` and render the document into it.
    pub fn mount(&mut self, element: HtmlElement) -> Result<(), JsError> {
        let mut session = self.session.borrow_mut();
        let view = EditorView::mount(element)?;
        view.render(&session.editor)?;
        session.view = Some(view);
        Ok(())
    }

    // === Content access ===

    #[wasm_bindgen(js_name = getMarkdown)]
    pub fn get_markdown(&self) -> String {
        self.session.borrow().editor.text()
    }

    #[wasm_bindgen(js_name = toHtml)]
    pub fn to_html(&self) -> String {
        self.session.borrow().editor.to_html()
    }

    #[wasm_bindgen(js_name = toBemHtml)]
    pub fn to_bem_html(&self) -> String {
        self.session.borrow().editor.to_bem_html()
    }

    #[wasm_bindgen(js_name = toJsx)]
    pub fn to_jsx(&self) -> String {
        self.session.borrow().editor.to_jsx()
    }

    /// Headings in document order, as `OutlineEntry[]`.
    pub fn outline(&self) -> Result<JsValue, JsError> {
        let session = self.session.borrow();
        let entries: Vec<OutlineEntry> =
            session.editor.outline().iter().map(OutlineEntry::from).collect();
        serde_wasm_bindgen::to_value(&entries)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = isReadOnly)]
    pub fn is_read_only(&self) -> bool {
        self.session.borrow().editor.is_read_only()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.borrow().editor.history().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.session.borrow().editor.history().can_redo()
    }

    // === DOM events ===

    /// Run the bound command, if any. Returns whether the key was handled.
    #[wasm_bindgen(js_name = handleKeydown)]
    pub fn handle_keydown(&mut self, event: &KeyboardEvent) -> Result<bool, JsError> {
        let command = keydown_command(&self.session.borrow().bindings, event);
        let Some(command) = command else {
            return Ok(false);
        };
        event.prevent_default();
        self.run(command)?;
        Ok(true)
    }

    #[wasm_bindgen(js_name = handleBeforeInput)]
    pub fn handle_before_input(&mut self, event: &InputEvent) -> Result<(), JsError> {
        let composing = event.is_composing() || self.session.borrow().composition.is_composing();
        let action = classify_beforeinput(&event.input_type(), event.data().as_deref(), composing);
        match action {
            InputAction::Edit(edit) => {
                event.prevent_default();
                self.dispatch(edit)?;
            }
            InputAction::Undo => {
                event.prevent_default();
                self.undo()?;
            }
            InputAction::Redo => {
                event.prevent_default();
                self.redo()?;
            }
            InputAction::Native => self.session.borrow_mut().capture_range()?,
        }
        Ok(())
    }

    /// Read a native edit back from the DOM.
    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&mut self, _event: &InputEvent) -> Result<(), JsError> {
        let outcome = {
            let mut session = self.session.borrow_mut();
            let text = session.dom_text();
            if !session.composition.should_read_input(&text) {
                return Ok(());
            }
            session.read_back()?
        };
        self.after(&outcome);
        Ok(())
    }

    #[wasm_bindgen(js_name = compositionStart)]
    pub fn composition_start(&mut self, _event: &CompositionEvent) -> Result<(), JsError> {
        let mut session = self.session.borrow_mut();
        session.capture_range()?;
        session.composition.start();
        Ok(())
    }

    #[wasm_bindgen(js_name = compositionEnd)]
    pub fn composition_end(&mut self, _event: &CompositionEvent) -> Result<(), JsError> {
        let outcome = {
            let mut session = self.session.borrow_mut();
            let outcome = session.read_back();
            let text = session.dom_text();
            session.composition.end(text);
            outcome?
        };
        self.after(&outcome);
        Ok(())
    }

    #[wasm_bindgen(js_name = selectionChange)]
    pub fn selection_change(&mut self) -> Result<(), JsError> {
        let mut session = self.session.borrow_mut();
        if session.composition.is_composing() {
            return Ok(());
        }
        session.sync_selection()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = handleCut)]
    pub fn handle_cut(&mut self, event: &ClipboardEvent) -> Result<(), JsError> {
        event.prevent_default();
        let outcome = self.dispatch(EditorEvent::Cut)?;
        if let Some(text) = outcome.clipboard {
            if !set_clipboard_text(event, &text) {
                write_clipboard_text(text);
            }
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = handleCopy)]
    pub fn handle_copy(&mut self, event: &ClipboardEvent) -> Result<(), JsError> {
        event.prevent_default();
        let text = {
            let mut session = self.session.borrow_mut();
            session.sync_selection()?;
            session.editor.state().selected_text()?
        };
        if !set_clipboard_text(event, &text) {
            write_clipboard_text(text);
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = handlePaste)]
    pub fn handle_paste(&mut self, event: &ClipboardEvent) -> Result<(), JsError> {
        event.prevent_default();
        if let Some(text) = clipboard_text(event) {
            self.dispatch(EditorEvent::Paste(text))?;
        }
        Ok(())
    }

    /// Toggle a todo checkbox if the click landed on one.
    #[wasm_bindgen(js_name = handleClick)]
    pub fn handle_click(&mut self, event: &MouseEvent) -> Result<(), JsError> {
        let target = {
            let session = self.session.borrow();
            let view = session.view.as_ref();
            event
                .target()
                .and_then(|target| view.and_then(|v| v.check_target(&target)))
        };
        let Some(line) = target else {
            return Ok(());
        };
        event.prevent_default();
        if let Some(view) = &self.session.borrow().view {
            view.blur()?;
        }
        self.dispatch(EditorEvent::CheckTodo(line))?;
        if let Some(view) = &self.session.borrow().view {
            view.focus()?;
        }
        Ok(())
    }

    // === Commands ===

    pub fn undo(&mut self) -> Result<bool, JsError> {
        let done = {
            let mut session = self.session.borrow_mut();
            let done = session.editor.undo();
            if done {
                session.render()?;
            }
            done
        };
        if done {
            self.schedule_flush();
        }
        Ok(done)
    }

    pub fn redo(&mut self) -> Result<bool, JsError> {
        let done = {
            let mut session = self.session.borrow_mut();
            let done = session.editor.redo();
            if done {
                session.render()?;
            }
            done
        };
        if done {
            self.schedule_flush();
        }
        Ok(done)
    }

    #[wasm_bindgen(js_name = toggleReadOnly)]
    pub fn toggle_read_only(&mut self) -> Result<bool, JsError> {
        self.dispatch(EditorEvent::ToggleReadOnly)?;
        Ok(self.is_read_only())
    }

    /// Save the document as `<first-heading-slug>.md`.
    pub fn download(&self) -> Result<(), JsError> {
        let session = self.session.borrow();
        download(&session.editor.download_name(), &session.editor.text())?;
        Ok(())
    }

    /// Commit pending history and write the document to storage now.
    pub fn save(&mut self) {
        self.flush.cancel();
        let mut session = self.session.borrow_mut();
        session.editor.flush_history();
        session.persist();
    }
}

impl JsEditor {
    fn build(text: &str, config: EditorConfig) -> Self {
        let storage_key = config.storage_key();
        let session = Session {
            editor: Editor::new(text, config),
            view: None,
            bindings: KeyBindings::default_for(platform().primary_is_meta()),
            composition: CompositionTracker::default(),
            pending_range: None,
            storage_key,
        };
        Self {
            session: Rc::new(RefCell::new(session)),
            flush: Debouncer::default(),
        }
    }

    fn run(&mut self, command: Command) -> Result<(), JsError> {
        match command {
            Command::Undo => self.undo().map(|_| ()),
            Command::Redo => self.redo().map(|_| ()),
            Command::Download => self.download(),
            other => match other.to_event() {
                Some(event) => self.dispatch(event).map(|_| ()),
                None => Ok(()),
            },
        }
    }

    fn dispatch(&mut self, event: EditorEvent) -> Result<Outcome, JsError> {
        let outcome = {
            let mut session = self.session.borrow_mut();
            session.sync_selection()?;
            let outcome = session
                .editor
                .dispatch(event, Instant::now())
                .inspect_err(|err| tracing::error!(target: "mdpad::edit", %err, "edit failed"))?;
            session.show(&outcome)?;
            outcome
        };
        self.after(&outcome);
        Ok(outcome)
    }

    fn after(&mut self, outcome: &Outcome) {
        if outcome.changed {
            self.schedule_flush();
        }
    }

    /// Commit the debounced history entry and persist once typing pauses.
    fn schedule_flush(&mut self) {
        let millis = self.session.borrow().editor.config().history_debounce_ms;
        let session = Rc::downgrade(&self.session);
        self.flush
            .schedule(u32::try_from(millis).unwrap_or(u32::MAX), move || {
                let Some(session) = session.upgrade() else {
                    return;
                };
                let mut session = session.borrow_mut();
                session.editor.tick(Instant::now());
                session.persist();
            });
    }
}
