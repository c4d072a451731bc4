pub mod document;
pub mod error;
pub mod virtual_document;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use virtual_document::{NodeId, NodeKind, VirtualDocument};
