use domhook_dom::{Document, DomError, DomResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Node};

use crate::error::HostError;
use crate::module::js_message;

/// [`Document`] over the page's live DOM.
pub struct BrowserDocument {
    document: web_sys::Document,
}

impl BrowserDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The document of the current window.
    pub fn from_window() -> Result<Self, HostError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or(HostError::NoDocument)
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }
}

fn describe(node: &Node) -> String {
    match node.dyn_ref::<Element>() {
        Some(element) if !element.class_name().is_empty() => {
            format!("<{}.{}>", node.node_name().to_lowercase(), element.class_name())
        }
        _ => node.node_name().to_lowercase(),
    }
}

fn host_error(value: JsValue) -> DomError {
    DomError::Host(js_message(&value))
}

impl Document for BrowserDocument {
    type Node = Node;

    fn elements_by_class(&self, class: &str) -> Vec<Node> {
        if class.is_empty() {
            return Vec::new();
        }
        // The collection is live; copy it out before anyone mutates the DOM.
        let live = self.document.get_elements_by_class_name(class);
        (0..live.length())
            .filter_map(|index| live.item(index))
            .map(Node::from)
            .collect()
    }

    fn set_inner_html(&mut self, node: &Node, markup: &str) -> DomResult<()> {
        let element = node
            .dyn_ref::<Element>()
            .ok_or_else(|| DomError::NotAnElement(describe(node)))?;
        element.set_inner_html(markup);
        Ok(())
    }

    fn append_child(&mut self, parent: &Node, child: &Node) -> DomResult<()> {
        if parent == child || child.contains(Some(parent)) {
            return Err(DomError::HierarchyRequest {
                parent: describe(parent),
                child: describe(child),
            });
        }
        parent.append_child(child).map(|_| ()).map_err(host_error)
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) -> DomResult<()> {
        self.check_child_of(parent, child)?;
        parent.remove_child(child).map(|_| ()).map_err(host_error)
    }

    fn check_parent(&self, parent: &Node) -> DomResult<()> {
        match parent.node_type() {
            Node::ELEMENT_NODE | Node::DOCUMENT_NODE | Node::DOCUMENT_FRAGMENT_NODE => Ok(()),
            _ => Err(DomError::NotAnElement(describe(parent))),
        }
    }

    fn check_child_of(&self, parent: &Node, child: &Node) -> DomResult<()> {
        if child.parent_node().as_ref() != Some(parent) {
            return Err(DomError::NotAChild {
                parent: describe(parent),
                child: describe(child),
            });
        }
        Ok(())
    }

    fn replace_child(&mut self, parent: &Node, new_child: &Node, old_child: &Node) -> DomResult<()> {
        self.check_child_of(parent, old_child)?;
        if new_child.contains(Some(parent)) {
            return Err(DomError::HierarchyRequest {
                parent: describe(parent),
                child: describe(new_child),
            });
        }
        parent
            .replace_child(new_child, old_child)
            .map(|_| ())
            .map_err(host_error)
    }

    fn clone_node(&mut self, node: &Node) -> DomResult<Node> {
        node.clone_node_with_deep(true).map_err(host_error)
    }

    fn create_text_node(&mut self, text: &str) -> DomResult<Node> {
        Ok(self.document.create_text_node(text).into())
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }
}
