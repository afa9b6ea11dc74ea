//! Native selection read and write.

use mdpad_editor_core::{DomPoint, SelectionHost};

use crate::errors::{BrowserError, window};
use crate::node::LiveNode;

/// The page's selection as anchor and focus points, if it lies inside `root`.
pub fn read_selection(
    root: &LiveNode,
) -> Result<Option<(DomPoint<LiveNode>, DomPoint<LiveNode>)>, BrowserError> {
    let Some(selection) = window()?.get_selection()? else {
        return Ok(None);
    };
    let (Some(anchor), Some(focus)) = (selection.anchor_node(), selection.focus_node()) else {
        return Ok(None);
    };
    if !root.0.contains(Some(&anchor)) || !root.0.contains(Some(&focus)) {
        return Ok(None);
    }
    tracing::trace!(
        target: "mdpad::dom",
        anchor = %anchor.node_name(),
        anchor_offset = selection.anchor_offset(),
        focus = %focus.node_name(),
        focus_offset = selection.focus_offset(),
        "read native selection"
    );
    Ok(Some((
        DomPoint::new(LiveNode(anchor), selection.anchor_offset() as usize),
        DomPoint::new(LiveNode(focus), selection.focus_offset() as usize),
    )))
}

/// Replace the page's selection.
pub fn write_selection(
    anchor: &DomPoint<LiveNode>,
    focus: &DomPoint<LiveNode>,
) -> Result<(), BrowserError> {
    let selection = window()?
        .get_selection()?
        .ok_or_else(|| BrowserError::Js("no selection object".into()))?;
    selection.set_base_and_extent(
        &anchor.node.0,
        anchor.offset as u32,
        &focus.node.0,
        focus.offset as u32,
    )?;
    Ok(())
}

/// Drops the page's selection before the reconciler mutates the DOM.
pub struct NativeSelection {
    window: web_sys::Window,
}

impl NativeSelection {
    pub fn new() -> Result<Self, BrowserError> {
        Ok(Self { window: window()? })
    }
}

impl SelectionHost for NativeSelection {
    fn drop_selection(&mut self) {
        if let Ok(Some(selection)) = self.window.get_selection() {
            if let Err(err) = selection.remove_all_ranges() {
                tracing::warn!(target: "mdpad::dom", ?err, "could not drop selection");
            }
        }
    }
}
