use domhook_bridge::BridgeError;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("no document: the host is not running in a browser window")]
    NoDocument,

    #[error("bridge is busy: re-entrant call dropped")]
    Busy,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl From<HostError> for JsValue {
    fn from(error: HostError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
