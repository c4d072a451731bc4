//! # Bridge Entry Points
//!
//! [`Bridge`] owns the document, the configuration and the module lifecycle,
//! and exposes one entry point per operator. Entry points are fire-and-forget:
//! they never return errors to the module. Faults are logged and dropped so
//! that a bad update cannot abort the caller.
//!
//! [`Bridge::try_dispatch`] is the fallible path underneath every entry point,
//! for hosts and tests that want the [`ApplyReport`].

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::lifecycle::{ModuleExports, ModuleLoader, ModuleState, Primitive};
use crate::operators::{apply, ApplyReport, Mutation};
use crate::payload::Payload;
use domhook_dom::Document;
use tracing::{debug, info, warn};

pub struct Bridge<D: Document, M> {
    document: D,
    config: BridgeConfig,
    module: ModuleState<M>,
}

impl<D: Document, M> Bridge<D, M> {
    pub fn new(document: D, config: BridgeConfig) -> Self {
        Self {
            document,
            config,
            module: ModuleState::Uninitialized,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.module.is_ready()
    }

    pub fn module(&self) -> BridgeResult<&M> {
        self.module.module()
    }

    /// Hand over an instantiated module. Only the first call succeeds.
    pub fn install(&mut self, module: M) -> BridgeResult<()> {
        self.module.install(module)?;
        info!(path = %self.config.module_path, "Module ready");
        Ok(())
    }

    /// Load the module from the configured path and install it.
    ///
    /// Awaiting this is the readiness gate. On failure the bridge stays
    /// uninitialized.
    pub async fn initialize<L>(&mut self, loader: &L) -> BridgeResult<()>
    where
        L: ModuleLoader<Module = M>,
    {
        if self.is_ready() {
            return Err(BridgeError::AlreadyInitialized);
        }

        let path = self.config.module_path.clone();
        info!(path = %path, "Instantiating module");
        let module = loader.load(&path).await.inspect_err(|error| {
            warn!(path = %path, error = %error, "Module instantiation failed");
        })?;
        self.install(module)
    }

    /// Apply a mutation, returning the report or the fault that stopped it.
    pub fn try_dispatch(
        &mut self,
        group: &str,
        mutation: Mutation<D::Node>,
    ) -> BridgeResult<ApplyReport> {
        self.module.module()?;
        apply(&mut self.document, group, mutation, &self.config)
    }

    fn dispatch(&mut self, group: &str, mutation: Mutation<D::Node>) {
        let operator = mutation.operator();
        match self.try_dispatch(group, mutation) {
            Ok(report) => {
                debug!(operator = %operator, group, applied = report.applied, "Bridge update done");
            }
            Err(error) => {
                warn!(operator = %operator, group, error = %error, "Bridge update dropped");
            }
        }
    }

    /// Replace the contents of every node in `group`.
    pub fn inner_html(&mut self, group: &str, payload: Payload<D::Node>) {
        self.dispatch(group, Mutation::ReplaceContents(payload));
    }

    pub fn append_child(&mut self, group: &str, payload: Payload<D::Node>) {
        self.dispatch(group, Mutation::AppendChild(payload));
    }

    pub fn remove_child(&mut self, group: &str, payload: Payload<D::Node>) {
        self.dispatch(group, Mutation::RemoveChild(payload));
    }

    /// Replace `outgoing` with `incoming` under every node in `group` that holds it.
    pub fn replace_child(&mut self, group: &str, incoming: Payload<D::Node>, outgoing: D::Node) {
        self.dispatch(group, Mutation::ReplaceChild { incoming, outgoing });
    }
}

impl<D: Document, M: ModuleExports> Bridge<D, M> {
    /// Call a computational export of the module, synchronously.
    pub fn call_export(&self, name: &str, args: &[Primitive]) -> BridgeResult<Primitive> {
        let module = self.module()?;
        debug!(export = name, args = args.len(), "Calling module export");
        module.call(name, args)
    }
}
