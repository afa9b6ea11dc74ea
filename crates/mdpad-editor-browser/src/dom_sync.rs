//! DOM synchronization for the markdown editor.
//!
//! Owns the mounted editor element and moves state between it and an
//! [`Editor`]: fresh renders are reconciled into the live tree, the native
//! selection is adopted or written back, and native edits are read back.

use mdpad_editor_core::dom::CONTENTEDITABLE;
use mdpad_editor_core::render::CHECK_ATTR;
use mdpad_editor_core::{Editor, LineId, Outcome, Selection, VNode, reconcile};
use wasm_bindgen::JsCast;
use web_time::Instant;

use crate::cursor::{NativeSelection, read_selection, write_selection};
use crate::errors::{BrowserError, document};
use crate::node::LiveNode;

/// The mounted editor element.
pub struct EditorView {
    element: web_sys::HtmlElement,
    root: LiveNode,
    document: web_sys::Document,
}

impl EditorView {
    pub fn mount(element: web_sys::HtmlElement) -> Result<Self, BrowserError> {
        let root = LiveNode(element.clone().into());
        Ok(Self {
            element,
            root,
            document: document()?,
        })
    }

    pub fn by_id(id: &str) -> Result<Self, BrowserError> {
        let element = document()?
            .get_element_by_id(id)
            .ok_or_else(|| BrowserError::ElementNotFound(id.to_string()))?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| BrowserError::ElementNotFound(id.to_string()))?;
        Self::mount(element)
    }

    pub fn element(&self) -> &web_sys::HtmlElement {
        &self.element
    }

    pub fn root(&self) -> &LiveNode {
        &self.root
    }

    /// Materialize a detached render as a live, unattached element.
    fn detached(&self, vnode: &VNode) -> Result<LiveNode, BrowserError> {
        let container = self.document.create_element("div")?;
        container.set_inner_html(&vnode.inner_html());
        Ok(LiveNode(container.into()))
    }

    /// Reconcile a fresh render of `editor` into the page and restore the caret.
    pub fn render(&self, editor: &Editor) -> Result<usize, BrowserError> {
        let fresh = self.detached(&editor.render())?;
        let mut host = NativeSelection::new()?;
        let mutations = reconcile(&fresh, &self.root, &mut host)?;
        let editable = if editor.is_read_only() { "false" } else { "true" };
        self.element.set_attribute(CONTENTEDITABLE, editable)?;
        tracing::debug!(target: "mdpad::dom", mutations, "rendered");
        if !editor.is_read_only() {
            self.restore_selection(editor)?;
        }
        Ok(mutations)
    }

    /// Render only when `outcome` says the document or mode changed.
    pub fn apply(&self, editor: &Editor, outcome: &Outcome) -> Result<(), BrowserError> {
        if outcome.needs_render() {
            self.render(editor)?;
        } else if !editor.is_read_only() {
            self.restore_selection(editor)?;
        }
        Ok(())
    }

    pub fn restore_selection(&self, editor: &Editor) -> Result<(), BrowserError> {
        let (anchor, focus) = editor.selection_points(&self.root)?;
        write_selection(&anchor, &focus)
    }

    /// Adopt the page's selection. Returns `None` if it lies outside the editor.
    pub fn sync_selection(&self, editor: &mut Editor) -> Result<Option<Selection>, BrowserError> {
        let Some((anchor, focus)) = read_selection(&self.root)? else {
            return Ok(None);
        };
        Ok(Some(editor.sync_selection(&self.root, &anchor, &focus)?))
    }

    /// Read a native edit back into the editor. `range` is the addressable
    /// range captured before the browser applied the edit.
    pub fn read_back(
        &self,
        editor: &mut Editor,
        range: &[LineId],
        now: Instant,
    ) -> Result<Outcome, BrowserError> {
        let outcome = editor.apply_native_input(&self.root, range, now)?;
        if let Some((anchor, focus)) = read_selection(&self.root)? {
            editor.sync_selection(&self.root, &anchor, &focus)?;
        }
        Ok(outcome)
    }

    /// The line a checkbox widget toggles, if `target` is one.
    pub fn check_target(&self, target: &web_sys::EventTarget) -> Option<LineId> {
        let element = target.dyn_ref::<web_sys::Element>()?;
        if !self.root.0.contains(Some(element.as_ref())) {
            return None;
        }
        element.get_attribute(CHECK_ATTR)?.parse().ok()
    }

    /// Checkbox clicks leave focus on the widget; toggling blurs the editor
    /// first and focuses it again afterwards.
    pub fn blur(&self) -> Result<(), BrowserError> {
        self.element.blur()?;
        Ok(())
    }

    pub fn focus(&self) -> Result<(), BrowserError> {
        self.element.focus()?;
        Ok(())
    }

    pub fn text_content(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }
}
