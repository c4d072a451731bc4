use crate::marshal::MarshalError;
use crate::operators::Operator;
use domhook_dom::DomError;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge is not ready: the module has not been instantiated")]
    NotReady,

    #[error("Module is already instantiated")]
    AlreadyInitialized,

    #[error("Malformed payload for {operator}: {reason}")]
    MalformedPayload { operator: Operator, reason: String },

    #[error("{operator} on group '{group}' resolved {count} nodes, singleton-only placement needs at most one")]
    AmbiguousTarget {
        operator: Operator,
        group: String,
        count: usize,
    },

    #[error("Failed to load module from '{path}': {message}")]
    Load { path: String, message: String },

    #[error("Module has no export named '{0}'")]
    MissingExport(String),

    #[error("Call to export '{name}' failed: {message}")]
    ExportCall { name: String, message: String },

    #[error("Marshalling error: {0}")]
    Marshal(#[from] MarshalError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
