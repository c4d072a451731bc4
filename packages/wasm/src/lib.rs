//! Browser host for the update bridge.
//!
//! Loads the compiled module with streaming instantiation, hands it the DOM
//! imports it calls, and exposes the same entry points to page scripts:
//!
//! ```js
//! import init, { configure, ready, uInnerHTML } from "./pkg/domhook_wasm.js";
//!
//! await init();
//! configure(JSON.stringify({ modulePath: "./pkg/bs.wasm" }));
//! await ready();
//! uInnerHTML("msg", ["Hello", "World"]);
//! ```

pub mod document;
pub mod error;
pub mod host;
pub mod loader;
pub mod module;
pub mod payload;

pub use document::BrowserDocument;
pub use error::HostError;
pub use loader::StreamingLoader;
pub use module::{BrowserModule, JsMemory};

use domhook_bridge::{BridgeConfig, ModuleLoader, Primitive};
use module::{primitive_from_js, primitive_to_js};
use payload::payload_from_js;
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::Node;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Dropped bridge calls are only reported through tracing; send it to the console.
    // Fails only when the embedding page already installed a subscriber.
    tracing_wasm::try_set_as_global_default().ok();
}

/// Set the bridge configuration from `domhook.config.json` contents.
#[wasm_bindgen(js_name = configure)]
pub fn configure_js(json: &str) -> Result<(), JsValue> {
    let config = BridgeConfig::from_json(json).map_err(HostError::from)?;
    host::configure(config)?;
    Ok(())
}

/// Fetch and instantiate the module. Resolves once the bridge is ready.
#[wasm_bindgen(js_name = ready)]
pub async fn ready_js() -> Result<(), JsValue> {
    let config = host::config()?;
    let loader = StreamingLoader::new(config.import_namespace.clone());
    // No borrow is held across the await: imports may fire during
    // instantiation and must find the cell free.
    let module = loader
        .load(&config.module_path)
        .await
        .inspect_err(|error| warn!(path = %config.module_path, error = %error, "Module instantiation failed"))
        .map_err(HostError::from)?;
    host::install(module)?;
    Ok(())
}

#[wasm_bindgen(js_name = isReady)]
pub fn is_ready_js() -> bool {
    host::with_bridge(|bridge| bridge.is_ready()).unwrap_or(false)
}

#[wasm_bindgen(js_name = uInnerHTML)]
pub fn inner_html_js(group: &str, update: JsValue) {
    let payload = payload_from_js(update);
    host::dispatch("uInnerHTML", |bridge| bridge.inner_html(group, payload));
}

#[wasm_bindgen(js_name = uAppendChild)]
pub fn append_child_js(group: &str, update: JsValue) {
    let payload = payload_from_js(update);
    host::dispatch("uAppendChild", |bridge| bridge.append_child(group, payload));
}

#[wasm_bindgen(js_name = uRemoveChild)]
pub fn remove_child_js(group: &str, update: JsValue) {
    let payload = payload_from_js(update);
    host::dispatch("uRemoveChild", |bridge| bridge.remove_child(group, payload));
}

#[wasm_bindgen(js_name = uReplaceChild)]
pub fn replace_child_js(group: &str, incoming: JsValue, outgoing: Node) {
    let payload = payload_from_js(incoming);
    host::dispatch("uReplaceChild", |bridge| {
        bridge.replace_child(group, payload, outgoing)
    });
}

/// Call a computational export of the module with primitive arguments.
#[wasm_bindgen(js_name = callExport)]
pub fn call_export_js(name: &str, args: Vec<JsValue>) -> Result<JsValue, JsValue> {
    let args = args
        .iter()
        .map(|arg| {
            primitive_from_js(arg)
                .ok_or_else(|| JsValue::from_str(&format!("argument {:?} is not a primitive", arg)))
        })
        .collect::<Result<Vec<Primitive>, JsValue>>()?;
    let result = host::call_export(name, &args)?;
    Ok(primitive_to_js(&result))
}
