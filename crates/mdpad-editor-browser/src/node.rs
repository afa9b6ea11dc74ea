//! `DomNode` over live `web_sys::Node`s.

use mdpad_editor_core::{DomError, DomNode};
use wasm_bindgen::{JsCast, JsValue};

/// Handle to a node in the page. Cloning clones the handle.
#[derive(Clone, Debug)]
pub struct LiveNode(pub web_sys::Node);

impl From<web_sys::Node> for LiveNode {
    fn from(node: web_sys::Node) -> Self {
        LiveNode(node)
    }
}

fn platform(err: JsValue) -> DomError {
    DomError::Platform(format!("{err:?}"))
}

impl DomNode for LiveNode {
    fn is_text(&self) -> bool {
        self.0.node_type() == web_sys::Node::TEXT_NODE
    }

    fn text_data(&self) -> Option<String> {
        if self.is_text() {
            self.0.node_value()
        } else {
            None
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.dyn_ref::<web_sys::Element>()?.get_attribute(name)
    }

    fn children(&self) -> Vec<Self> {
        let list = self.0.child_nodes();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(LiveNode)
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent_node().map(LiveNode)
    }

    fn same_node(&self, other: &Self) -> bool {
        self.0.is_same_node(Some(&other.0))
    }

    fn deep_equal(&self, other: &Self) -> bool {
        self.0.is_equal_node(Some(&other.0))
    }

    fn clone_deep(&self) -> Result<Self, DomError> {
        self.0.clone_node_with_deep(true).map(LiveNode).map_err(platform)
    }

    fn replace_child(&self, new_child: &Self, old_child: &Self) -> Result<(), DomError> {
        self.0
            .replace_child(&new_child.0, &old_child.0)
            .map(|_| ())
            .map_err(platform)
    }

    fn remove_child(&self, child: &Self) -> Result<(), DomError> {
        self.0.remove_child(&child.0).map(|_| ()).map_err(platform)
    }

    fn insert_before(&self, new_child: &Self, reference: Option<&Self>) -> Result<(), DomError> {
        self.0
            .insert_before(&new_child.0, reference.map(|r| &r.0))
            .map(|_| ())
            .map_err(platform)
    }

    fn contains(&self, other: &Self) -> bool {
        self.0.contains(Some(&other.0))
    }
}
