//! # domhook bridge
//!
//! Lets a compiled module update groups of document nodes without carrying any
//! document logic itself.
//!
//! Every update follows the same path:
//!
//! ```text
//! module → entry point (group, payload) → normalizer → resolver → operator per node
//! ```
//!
//! - [`resolver`] maps a class-style group id to a fresh snapshot of nodes.
//! - [`normalizer`] turns a payload into its canonical value.
//! - [`operators`] apply one of four mutations to every node of a group.
//! - [`entry`] holds the [`Bridge`] with its fire-and-forget entry points.
//! - [`lifecycle`] gates the entry points on module instantiation.
//! - [`marshal`] and [`abi`] decode arguments out of module memory.
//! - [`glue`] emits the JavaScript loader and update functions.

pub mod abi;
pub mod config;
pub mod entry;
pub mod error;
pub mod glue;
pub mod lifecycle;
pub mod marshal;
pub mod normalizer;
pub mod operators;
pub mod payload;
pub mod resolver;

#[cfg(test)]
mod tests_operators;

#[cfg(test)]
mod tests_lifecycle;

pub use config::{BridgeConfig, MalformedPayloadPolicy, MultiTargetPolicy, DEFAULT_CONFIG_NAME};
pub use entry::Bridge;
pub use error::{BridgeError, BridgeResult};
pub use glue::generate_glue;
pub use lifecycle::{ModuleExports, ModuleLoader, ModuleState, Primitive};
pub use marshal::{LinearMemory, MarshalError, StrRef};
pub use normalizer::{join_text, normalize};
pub use operators::{apply, ApplyReport, Mutation, Operator, SkippedNode};
pub use payload::{Payload, Renderable};
pub use resolver::{resolve, ResolvedGroup};
