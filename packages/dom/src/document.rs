use crate::error::DomResult;
use std::fmt::Debug;

/// The document operations the update bridge is built on.
///
/// Node handles refer to nodes owned by the document and must be cheap to
/// clone. Every mutation targets exactly one node; batching across a group is
/// the bridge's job, not the document's.
pub trait Document {
    type Node: Clone + PartialEq + Debug;

    /// Elements carrying `class`, in document order.
    ///
    /// The returned vector is a snapshot: mutating the document afterwards
    /// never changes it.
    fn elements_by_class(&self, class: &str) -> Vec<Self::Node>;

    /// Replace all content of `node` with raw markup. No escaping.
    fn set_inner_html(&mut self, node: &Self::Node, markup: &str) -> DomResult<()>;

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;

    /// `Ok` when `parent` can hold children. Nothing is mutated.
    fn check_parent(&self, parent: &Self::Node) -> DomResult<()>;

    /// `Ok` when `child` is currently a direct child of `parent`.
    fn check_child_of(&self, parent: &Self::Node, child: &Self::Node) -> DomResult<()>;

    /// Put `new_child` where `old_child` currently sits under `parent`.
    fn replace_child(
        &mut self,
        parent: &Self::Node,
        new_child: &Self::Node,
        old_child: &Self::Node,
    ) -> DomResult<()>;

    /// Deep clone. The clone is detached.
    fn clone_node(&mut self, node: &Self::Node) -> DomResult<Self::Node>;

    fn create_text_node(&mut self, text: &str) -> DomResult<Self::Node>;

    fn text_content(&self, node: &Self::Node) -> String;
}
