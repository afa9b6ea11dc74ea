//! In-memory DOM.
//!
//! `VNode` is what [`crate::render`] produces: it is serialized with
//! [`VNode::inner_html`] for the browser, and it implements [`DomNode`] so the
//! cursor model and reconciler run natively in tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smol_str::SmolStr;

use crate::dom::{DomError, DomNode};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "input", "img"];

#[derive(Clone, Debug, PartialEq, Eq)]
enum Kind {
    Text(String),
    Element {
        tag: SmolStr,
        attrs: Vec<(SmolStr, String)>,
    },
}

#[derive(Debug)]
struct Data {
    kind: Kind,
    parent: Weak<RefCell<Data>>,
    children: Vec<VNode>,
}

/// Shared handle to an in-memory node. Equality is node identity.
#[derive(Clone)]
pub struct VNode(Rc<RefCell<Data>>);

impl PartialEq for VNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VNode {}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}

impl VNode {
    fn from_kind(kind: Kind) -> Self {
        VNode(Rc::new(RefCell::new(Data {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
        })))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::from_kind(Kind::Text(text.into()))
    }

    pub fn element(tag: &str) -> Self {
        Self::from_kind(Kind::Element {
            tag: SmolStr::new(tag),
            attrs: Vec::new(),
        })
    }

    /// Builder form of [`VNode::set_attr`].
    pub fn attr(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`VNode::push`].
    pub fn child(self, child: VNode) -> Self {
        self.push(child);
        self
    }

    pub fn set_attr(&self, name: &str, value: impl Into<String>) {
        if let Kind::Element { attrs, .. } = &mut self.0.borrow_mut().kind {
            let value = value.into();
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value,
                None => attrs.push((SmolStr::new(name), value)),
            }
        }
    }

    /// Append `child`, skipping empty text nodes the way an HTML parser would.
    pub fn push(&self, child: VNode) {
        if matches!(&child.0.borrow().kind, Kind::Text(t) if t.is_empty()) {
            return;
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child);
    }

    /// Replace a text node's data.
    pub fn set_text(&self, text: impl Into<String>) {
        if let Kind::Text(t) = &mut self.0.borrow_mut().kind {
            *t = text.into();
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            Kind::Text(t) => t.clone(),
            Kind::Element { .. } => data.children.iter().map(VNode::text_content).collect(),
        }
    }

    /// First descendant (or self) whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<VNode> {
        if self.attribute("id").as_deref() == Some(id) {
            return Some(self.clone());
        }
        self.children().iter().find_map(|c| c.find_by_id(id))
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialized children, suitable for `innerHTML`.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.0.borrow().children {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            Kind::Text(t) => out.push_str(&html_escape::encode_text(t)),
            Kind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&html_escape::encode_double_quoted_attribute(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &data.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn detach(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(&c.0, &self.0));
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn index_of(&self, child: &VNode) -> Option<usize> {
        self.0
            .borrow()
            .children
            .iter()
            .position(|c| Rc::ptr_eq(&c.0, &child.0))
    }
}

impl DomNode for VNode {
    fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, Kind::Text(_))
    }

    fn text_data(&self) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Text(t) => Some(t.clone()),
            Kind::Element { .. } => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            Kind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            Kind::Text(_) => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.0.borrow().children.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.0.borrow().parent.upgrade().map(VNode)
    }

    fn same_node(&self, other: &Self) -> bool {
        self == other
    }

    fn deep_equal(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        a.kind == b.kind
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(&b.children)
                .all(|(x, y)| x.deep_equal(y))
    }

    fn clone_deep(&self) -> Result<Self, DomError> {
        let data = self.0.borrow();
        let copy = VNode::from_kind(data.kind.clone());
        for child in &data.children {
            copy.push(child.clone_deep()?);
        }
        Ok(copy)
    }

    fn replace_child(&self, new_child: &Self, old_child: &Self) -> Result<(), DomError> {
        if self.index_of(old_child).is_none() {
            return Err(DomError::NotAChild);
        }
        new_child.detach();
        let index = self.index_of(old_child).ok_or(DomError::NotAChild)?;
        new_child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        old_child.0.borrow_mut().parent = Weak::new();
        self.0.borrow_mut().children[index] = new_child.clone();
        Ok(())
    }

    fn remove_child(&self, child: &Self) -> Result<(), DomError> {
        let index = self.index_of(child).ok_or(DomError::NotAChild)?;
        self.0.borrow_mut().children.remove(index);
        child.0.borrow_mut().parent = Weak::new();
        Ok(())
    }

    fn insert_before(&self, new_child: &Self, reference: Option<&Self>) -> Result<(), DomError> {
        if self.is_text() {
            return Err(DomError::NotAnElement);
        }
        if let Some(reference) = reference {
            if self.index_of(reference).is_none() {
                return Err(DomError::NotAChild);
            }
        }
        new_child.detach();
        let index = match reference {
            Some(reference) => self.index_of(reference).ok_or(DomError::NotAChild)?,
            None => self.0.borrow().children.len(),
        };
        new_child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.insert(index, new_child.clone());
        Ok(())
    }
}
