//! Streaming instantiation of the compiled module.
//!
//! The import object wires the module's DOM imports to the bridge entry
//! points. Imports called before the module is installed are dropped with
//! `NotReady`, like any other early call.

use crate::host;
use crate::module::{js_message, BrowserModule};
use domhook_bridge::{abi, BridgeError, BridgeResult, ModuleLoader, Operator, StrRef};
use js_sys::{Object, Reflect, WebAssembly};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Node;

pub struct StreamingLoader {
    namespace: String,
}

impl StreamingLoader {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// `{ <namespace>: { uInnerHTML, uInnerHTMLList, uAppendChild, uRemoveChild, uReplaceChild } }`
    pub fn import_object(&self) -> Result<Object, JsValue> {
        let functions = Object::new();
        let set = |name: &str, function: JsValue| {
            Reflect::set(&functions, &JsValue::from_str(name), &function).map(|_| ())
        };

        set(
            "uInnerHTML",
            Closure::<dyn Fn(u32, u32, u32, u32)>::new(|group_ptr, group_len, ptr, len| {
                with_memory(Operator::ReplaceContents, |bridge, memory| {
                    abi::inner_html(
                        bridge,
                        memory,
                        StrRef::new(group_ptr, group_len),
                        StrRef::new(ptr, len),
                    )
                })
            })
            .into_js_value(),
        )?;
        set(
            "uInnerHTMLList",
            Closure::<dyn Fn(u32, u32, u32, u32)>::new(|group_ptr, group_len, list_ptr, count| {
                with_memory(Operator::ReplaceContents, |bridge, memory| {
                    abi::inner_html_list(
                        bridge,
                        memory,
                        StrRef::new(group_ptr, group_len),
                        list_ptr,
                        count,
                    )
                })
            })
            .into_js_value(),
        )?;
        set(
            "uAppendChild",
            Closure::<dyn Fn(u32, u32, JsValue)>::new(|group_ptr, group_len, node: JsValue| {
                let Some(node) = as_node(Operator::AppendChild, node) else {
                    return;
                };
                with_memory(Operator::AppendChild, |bridge, memory| {
                    abi::append_child(bridge, memory, StrRef::new(group_ptr, group_len), node)
                })
            })
            .into_js_value(),
        )?;
        set(
            "uRemoveChild",
            Closure::<dyn Fn(u32, u32, JsValue)>::new(|group_ptr, group_len, node: JsValue| {
                let Some(node) = as_node(Operator::RemoveChild, node) else {
                    return;
                };
                with_memory(Operator::RemoveChild, |bridge, memory| {
                    abi::remove_child(bridge, memory, StrRef::new(group_ptr, group_len), node)
                })
            })
            .into_js_value(),
        )?;
        set(
            "uReplaceChild",
            Closure::<dyn Fn(u32, u32, JsValue, JsValue)>::new(
                |group_ptr, group_len, incoming: JsValue, outgoing: JsValue| {
                    let (Some(incoming), Some(outgoing)) = (
                        as_node(Operator::ReplaceChild, incoming),
                        as_node(Operator::ReplaceChild, outgoing),
                    ) else {
                        return;
                    };
                    with_memory(Operator::ReplaceChild, |bridge, memory| {
                        abi::replace_child(
                            bridge,
                            memory,
                            StrRef::new(group_ptr, group_len),
                            incoming,
                            outgoing,
                        )
                    })
                },
            )
            .into_js_value(),
        )?;

        let imports = Object::new();
        Reflect::set(&imports, &JsValue::from_str(&self.namespace), &functions)?;
        Ok(imports)
    }
}

fn as_node(operator: Operator, value: JsValue) -> Option<Node> {
    value
        .dyn_into::<Node>()
        .inspect_err(|value| {
            warn!(operator = %operator, value = ?value, "Import argument is not a node");
        })
        .ok()
}

fn with_memory(
    operator: Operator,
    f: impl FnOnce(&mut host::HostBridge, &crate::module::JsMemory),
) {
    host::dispatch(operator.import_name(), |bridge| match bridge.module() {
        Ok(module) => {
            let memory = module.memory();
            f(bridge, &memory);
        }
        Err(error) => {
            warn!(operator = %operator, error = %error, "Import called before the module is ready");
        }
    });
}

fn load_error(path: &str, error: &JsValue) -> BridgeError {
    BridgeError::Load {
        path: path.to_string(),
        message: js_message(error),
    }
}

impl ModuleLoader for StreamingLoader {
    type Module = BrowserModule;

    async fn load(&self, path: &str) -> BridgeResult<BrowserModule> {
        let window = web_sys::window().ok_or_else(|| BridgeError::Load {
            path: path.to_string(),
            message: "no window".to_string(),
        })?;
        let imports = self.import_object().map_err(|error| load_error(path, &error))?;

        info!(path, namespace = %self.namespace, "Fetching module");
        let response = window.fetch_with_str(path);
        let result = JsFuture::from(WebAssembly::instantiate_streaming(&response, &imports))
            .await
            .map_err(|error| load_error(path, &error))?;

        let instance: WebAssembly::Instance = Reflect::get(&result, &JsValue::from_str("instance"))
            .and_then(|value| value.dyn_into())
            .map_err(|error| load_error(path, &error))?;
        BrowserModule::from_exports(instance.exports())
    }
}
