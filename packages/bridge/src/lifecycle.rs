//! # Module Lifecycle
//!
//! The instantiated module is the bridge's only global state. It moves through
//! two phases exactly once:
//!
//! ```text
//! Uninitialized ──install──▶ Ready(module)
//! ```
//!
//! Entry points are only defined in `Ready`; calling one earlier fails with
//! [`BridgeError::NotReady`] instead of touching a missing module.
//!
//! Instantiation itself is a single asynchronous operation with one outcome
//! ([`ModuleLoader::load`]). Awaiting it is the readiness gate: nothing may
//! dispatch a bridge call until it has completed. The bridge's own operators
//! never suspend.

use crate::error::{BridgeError, BridgeResult};
use std::fmt;
use std::future::Future;

/// Primitive-compatible value crossing into or out of the module.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Unit,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Primitive {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Int(value) => Some(*value as f64),
            Primitive::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Unit => Ok(()),
            Primitive::Int(value) => write!(f, "{}", value),
            Primitive::Float(value) => write!(f, "{}", value),
            Primitive::Text(text) => f.write_str(text),
        }
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Primitive::Int(value.into())
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Int(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Float(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::Text(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::Text(value)
    }
}

/// Computational entry points exported by the compiled module.
///
/// Calls are synchronous and made from the page's single thread.
pub trait ModuleExports {
    fn call(&self, name: &str, args: &[Primitive]) -> BridgeResult<Primitive>;
}

/// Fetches and instantiates the compiled module.
pub trait ModuleLoader {
    type Module;

    fn load(&self, path: &str) -> impl Future<Output = BridgeResult<Self::Module>>;
}

#[derive(Debug)]
pub enum ModuleState<M> {
    Uninitialized,
    Ready(M),
}

impl<M> ModuleState<M> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModuleState::Ready(_))
    }

    /// Move to `Ready`. Only the first call succeeds.
    pub fn install(&mut self, module: M) -> BridgeResult<()> {
        match self {
            ModuleState::Ready(_) => Err(BridgeError::AlreadyInitialized),
            ModuleState::Uninitialized => {
                *self = ModuleState::Ready(module);
                Ok(())
            }
        }
    }

    pub fn module(&self) -> BridgeResult<&M> {
        match self {
            ModuleState::Ready(module) => Ok(module),
            ModuleState::Uninitialized => Err(BridgeError::NotReady),
        }
    }
}

impl<M> Default for ModuleState<M> {
    fn default() -> Self {
        ModuleState::Uninitialized
    }
}
