use thiserror::Error;

/// Errors raised by a host document when a single-node mutation is not
/// structurally valid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("node {child} is not a child of node {parent}")]
    NotAChild { parent: String, child: String },

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("node {0} is not an element")]
    NotAnElement(String),

    #[error("cannot insert node {child} into node {parent}: hierarchy request")]
    HierarchyRequest { parent: String, child: String },

    #[error("host document error: {0}")]
    Host(String),
}

pub type DomResult<T> = Result<T, DomError>;
