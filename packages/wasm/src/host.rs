//! The page's single bridge.
//!
//! The bridge lives in a thread-local cell. Every access goes through
//! [`with_bridge`], which takes the borrow for the duration of one call only.
//! Module exports are invoked through [`call_export`], which releases the
//! borrow first so the module may call back into the entry points.

use crate::document::BrowserDocument;
use crate::error::HostError;
use crate::module::BrowserModule;
use domhook_bridge::{Bridge, BridgeConfig, BridgeError, ModuleExports, Primitive};
use std::cell::RefCell;
use tracing::warn;

pub type HostBridge = Bridge<BrowserDocument, BrowserModule>;

thread_local! {
    static BRIDGE: RefCell<Option<HostBridge>> = const { RefCell::new(None) };
}

/// Run `f` against the page bridge, creating it with the default config on
/// first use.
pub fn with_bridge<R>(f: impl FnOnce(&mut HostBridge) -> R) -> Result<R, HostError> {
    BRIDGE.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| HostError::Busy)?;
        if slot.is_none() {
            *slot = Some(Bridge::new(
                BrowserDocument::from_window()?,
                BridgeConfig::default(),
            ));
        }
        let bridge = slot.as_mut().ok_or(HostError::NoDocument)?;
        Ok(f(bridge))
    })
}

/// Like [`with_bridge`], for fire-and-forget callers: faults are logged.
pub fn dispatch(name: &str, f: impl FnOnce(&mut HostBridge)) {
    if let Err(error) = with_bridge(f) {
        warn!(entry = name, error = %error, "Bridge call dropped");
    }
}

/// Replace the configuration. Only allowed before the module is ready.
pub fn configure(config: BridgeConfig) -> Result<(), HostError> {
    BRIDGE.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| HostError::Busy)?;
        if slot.as_ref().is_some_and(|bridge| bridge.is_ready()) {
            return Err(BridgeError::AlreadyInitialized.into());
        }
        *slot = Some(Bridge::new(BrowserDocument::from_window()?, config));
        Ok(())
    })
}

pub fn config() -> Result<BridgeConfig, HostError> {
    with_bridge(|bridge| bridge.config().clone())
}

pub fn install(module: BrowserModule) -> Result<(), HostError> {
    with_bridge(|bridge| bridge.install(module))??;
    Ok(())
}

/// Call a module export without holding the bridge borrow.
pub fn call_export(name: &str, args: &[Primitive]) -> Result<Primitive, HostError> {
    let module = with_bridge(|bridge| bridge.module().cloned())??;
    Ok(module.call(name, args)?)
}
