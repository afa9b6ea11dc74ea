//! Minimal DOM interface used by the cursor model and the reconciler.
//!
//! The browser crate implements this over `web_sys::Node`; [`crate::vdom::VNode`]
//! implements it in memory so cursor walks and reconciliation are testable
//! without a browser.

use std::fmt;

pub use crate::error::DomError;

/// Marks a line-level element. Its `id` attribute is the line's [`crate::LineId`].
pub const NODE_MARKER: &str = "data-node";
/// Marks a top-level block element.
pub const ROOT_MARKER: &str = "data-root";
/// Marks a zero-width decoration (checkbox widgets and the like). Its subtree
/// contributes no characters to any offset walk.
pub const ZERO_WIDTH_MARKER: &str = "data-zw";
/// Marks a syntax span hidden in read-only mode. Its text still counts, but a
/// caret may not rest inside it.
pub const HIDDEN_MARKER: &str = "data-hidden";
/// Standard attribute that also excludes a subtree from offset walks.
pub const CONTENTEDITABLE: &str = "contenteditable";

/// A handle to a node in some DOM-like tree. Cloning clones the handle, not
/// the node.
pub trait DomNode: Clone + fmt::Debug {
    fn is_text(&self) -> bool;

    /// Character data of a text node; `None` for elements.
    fn text_data(&self) -> Option<String>;

    /// Attribute value on an element; `None` for text nodes or absent attributes.
    fn attribute(&self, name: &str) -> Option<String>;

    fn children(&self) -> Vec<Self>;

    fn parent(&self) -> Option<Self>;

    /// Node identity.
    fn same_node(&self, other: &Self) -> bool;

    /// Structural equality, like `Node.isEqualNode`.
    fn deep_equal(&self, other: &Self) -> bool;

    /// Detached deep copy.
    fn clone_deep(&self) -> Result<Self, DomError>;

    fn replace_child(&self, new_child: &Self, old_child: &Self) -> Result<(), DomError>;

    fn remove_child(&self, child: &Self) -> Result<(), DomError>;

    /// Insert before `reference`, or append when `reference` is `None`.
    fn insert_before(&self, new_child: &Self, reference: Option<&Self>) -> Result<(), DomError>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn append_child(&self, child: &Self) -> Result<(), DomError> {
        self.insert_before(child, None)
    }

    /// Whether `other` is this node or one of its descendants.
    fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.same_node(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Whether this subtree is excluded from offset walks.
    fn is_zero_width(&self) -> bool {
        self.has_attribute(ZERO_WIDTH_MARKER)
            || self.attribute(CONTENTEDITABLE).as_deref() == Some("false")
    }
}
