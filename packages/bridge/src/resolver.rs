use domhook_dom::Document;
use tracing::debug;

/// Nodes carrying a group id at the instant of resolution.
///
/// Owned and detached from the document: later mutations never change it.
/// Lives for one bridge call and is never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGroup<N> {
    group: String,
    nodes: Vec<N>,
}

impl<N> ResolvedGroup<N> {
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }
}

impl<'a, N> IntoIterator for &'a ResolvedGroup<N> {
    type Item = &'a N;
    type IntoIter = std::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Resolve `group` against the document as it is right now.
///
/// No match is an empty group, not an error.
pub fn resolve<D: Document>(doc: &D, group: &str) -> ResolvedGroup<D::Node> {
    let nodes = doc.elements_by_class(group);
    debug!(group, nodes = nodes.len(), "Resolved group");
    ResolvedGroup {
        group: group.to_string(),
        nodes,
    }
}
