//! # Virtual Document
//!
//! Arena-backed in-memory document implementing [`Document`].
//!
//! ## Purpose
//!
//! Hosts the update bridge outside a browser and gives tests a document whose
//! structure can be inspected after every call. Nodes live in an arena and are
//! addressed by [`NodeId`]. Detached nodes stay in the arena so handles held by
//! a caller remain valid after removal, the same way a browser keeps a removed
//! node alive while script still references it.
//!
//! ## Content model
//!
//! - `Element` nodes carry a tag, an ordered class list and attributes.
//! - `Text` nodes carry plain text, escaped when serialized.
//! - `Markup` nodes hold raw markup assigned through `set_inner_html`. The
//!   markup is stored verbatim and never parsed. Their text content is the
//!   markup with tags removed and the common entities decoded, close to what a
//!   browser reports for the parsed fragment.
//!
//! Markup nodes belong to the element they were assigned to. When
//! `set_inner_html` drops one, its slot is reused by the next markup node, so
//! repeated replaces keep the arena at a fixed size. A handle to a markup node
//! does not survive the next replace of its element.
//!
//! ## Usage
//!
//! ```rust
//! use domhook_dom::{Document, VirtualDocument};
//!
//! let mut doc = VirtualDocument::new();
//! let p = doc.create_element("p");
//! doc.add_class(p, "msg").unwrap();
//! let root = doc.root();
//! doc.append_child(&root, &p).unwrap();
//!
//! doc.set_inner_html(&p, "Hello World").unwrap();
//! assert_eq!(doc.outer_html(p), r#"<p class="msg">Hello World</p>"#);
//! ```

use crate::document::Document;
use crate::error::{DomError, DomResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a node in a [`VirtualDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attributes: BTreeMap<String, String>,
    },

    Text { content: String },

    Markup { content: String },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct VirtualDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    /// Markup nodes dropped by `set_inner_html`, free for reuse.
    spare_markup: Vec<NodeId>,
}

impl VirtualDocument {
    /// Create a document with a single `body` root element.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            spare_markup: Vec::new(),
        };
        doc.root = doc.alloc(NodeKind::Element {
            tag: "body".to_string(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
        });
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.into(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text {
            content: content.into(),
        })
    }

    pub fn add_class(&mut self, node: NodeId, class: impl Into<String>) -> DomResult<()> {
        let class = class.into();
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { classes, .. } => {
                if !classes.contains(&class) {
                    classes.push(class);
                }
                Ok(())
            }
            _ => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { classes, .. } => {
                classes.retain(|c| c != class);
                Ok(())
            }
            _ => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        match &mut self.data_mut(node)?.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.insert(key.into(), value.into());
                Ok(())
            }
            _ => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|data| &data.kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|data| data.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    /// True when `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor(self.root, node)
    }

    /// Serialized content of `node`, without the node itself.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn alloc_markup(&mut self, content: &str) -> NodeId {
        // A caller may have re-attached a dropped markup node; those are not spare.
        while let Some(id) = self.spare_markup.pop() {
            if self.nodes[id.0].parent.is_none() {
                self.nodes[id.0].kind = NodeKind::Markup {
                    content: content.to_string(),
                };
                return id;
            }
        }
        self.alloc(NodeKind::Markup {
            content: content.to_string(),
        })
    }

    fn data(&self, node: NodeId) -> DomResult<&NodeData> {
        self.nodes
            .get(node.0)
            .ok_or_else(|| DomError::UnknownNode(node.to_string()))
    }

    fn data_mut(&mut self, node: NodeId) -> DomResult<&mut NodeData> {
        self.nodes
            .get_mut(node.0)
            .ok_or_else(|| DomError::UnknownNode(node.to_string()))
    }

    fn require_element(&self, node: NodeId) -> DomResult<()> {
        match self.data(node)?.kind {
            NodeKind::Element { .. } => Ok(()),
            _ => Err(DomError::NotAnElement(node.to_string())),
        }
    }

    /// True when `ancestor` is a strict ancestor of `node`.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `child` may go under `parent` unless that would make a node its own ancestor.
    fn check_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.require_element(parent)?;
        self.data(child)?;
        if child == parent || self.is_ancestor(child, parent) || child == self.root {
            return Err(DomError::HierarchyRequest {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let kind = self.nodes[node.0].kind.clone();
        let children = self.nodes[node.0].children.clone();
        let copy = self.alloc(kind);
        for child in children {
            let child_copy = self.deep_clone(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    fn collect_by_class(&self, node: NodeId, class: &str, out: &mut Vec<NodeId>) {
        let data = &self.nodes[node.0];
        if let NodeKind::Element { classes, .. } = &data.kind {
            if classes.iter().any(|c| c == class) {
                out.push(node);
            }
        }
        for child in &data.children {
            self.collect_by_class(*child, class, out);
        }
    }

    fn write_text(&self, node: NodeId, out: &mut String) {
        let data = &self.nodes[node.0];
        match &data.kind {
            NodeKind::Text { content } => out.push_str(content),
            NodeKind::Markup { content } => write_markup_text(content, out),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    self.write_text(*child, out);
                }
            }
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.kind {
            NodeKind::Element {
                tag,
                classes,
                attributes,
            } => {
                out.push('<');
                out.push_str(tag);
                if !classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape(&classes.join(" "))));
                }
                for (key, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", key, escape(value)));
                }
                out.push('>');
                for child in &data.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
            NodeKind::Text { content } => out.push_str(&escape(content)),
            NodeKind::Markup { content } => out.push_str(content),
        }
    }
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for VirtualDocument {
    type Node = NodeId;

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !class.is_empty() {
            self.collect_by_class(self.root, class, &mut out);
        }
        out
    }

    fn set_inner_html(&mut self, node: &NodeId, markup: &str) -> DomResult<()> {
        self.require_element(*node)?;
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
            if matches!(self.nodes[child.0].kind, NodeKind::Markup { .. }) {
                self.spare_markup.push(child);
            }
        }
        if !markup.is_empty() {
            let content = self.alloc_markup(markup);
            self.nodes[content.0].parent = Some(*node);
            self.nodes[node.0].children.push(content);
        }
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> DomResult<()> {
        self.check_insertable(*parent, *child)?;
        self.detach(*child);
        self.nodes[child.0].parent = Some(*parent);
        self.nodes[parent.0].children.push(*child);
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> DomResult<()> {
        self.check_child_of(parent, child)?;
        self.detach(*child);
        Ok(())
    }

    fn check_parent(&self, parent: &NodeId) -> DomResult<()> {
        self.require_element(*parent)
    }

    fn check_child_of(&self, parent: &NodeId, child: &NodeId) -> DomResult<()> {
        self.data(*parent)?;
        if self.data(*child)?.parent != Some(*parent) {
            return Err(DomError::NotAChild {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: &NodeId,
        new_child: &NodeId,
        old_child: &NodeId,
    ) -> DomResult<()> {
        self.check_child_of(parent, old_child)?;
        if new_child == old_child {
            return Ok(());
        }
        self.check_insertable(*parent, *new_child)?;

        self.detach(*new_child);
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| c == old_child)
            .ok_or_else(|| DomError::NotAChild {
                parent: parent.to_string(),
                child: old_child.to_string(),
            })?;
        self.nodes[parent.0].children[index] = *new_child;
        self.nodes[new_child.0].parent = Some(*parent);
        self.nodes[old_child.0].parent = None;
        Ok(())
    }

    fn clone_node(&mut self, node: &NodeId) -> DomResult<NodeId> {
        self.data(*node)?;
        Ok(self.deep_clone(*node))
    }

    fn create_text_node(&mut self, text: &str) -> DomResult<NodeId> {
        Ok(self.create_text(text))
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        if self.nodes.get(node.0).is_some() {
            self.write_text(*node, &mut out);
        }
        out
    }
}

/// Text of a markup fragment: tags dropped, common entities decoded.
fn write_markup_text(markup: &str, out: &mut String) {
    let mut rest = markup;
    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match rest.find('>') {
                Some(end) => rest = &rest[end + 1..],
                None => break,
            },
            '&' => {
                let entity = ENTITIES
                    .iter()
                    .find(|(name, _)| rest.starts_with(name));
                match entity {
                    Some((name, decoded)) => {
                        out.push(*decoded);
                        rest = &rest[name.len()..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
}

const ENTITIES: [(&str, char); 6] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&nbsp;", '\u{a0}'),
];

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
