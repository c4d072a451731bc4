use domhook_bridge::{Payload, Renderable};
use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Node;

/// Read a JavaScript update value as a payload.
///
/// Arrays become sequences; strings, numbers and nodes become scalars.
pub fn payload_from_js(value: JsValue) -> Payload<Node> {
    if Array::is_array(&value) {
        let items = Array::from(&value).iter().map(renderable_from_js).collect();
        Payload::Sequence(items)
    } else {
        Payload::Scalar(renderable_from_js(value))
    }
}

fn renderable_from_js(value: JsValue) -> Renderable<Node> {
    if let Some(text) = value.as_string() {
        return Renderable::Text(text);
    }
    if let Some(number) = value.as_f64() {
        return Renderable::Number(number);
    }
    if let Some(flag) = value.as_bool() {
        return Renderable::Text(flag.to_string());
    }
    if value.is_undefined() || value.is_null() {
        return Renderable::Text(String::new());
    }
    match value.dyn_into::<Node>() {
        Ok(node) => Renderable::Node(node),
        Err(other) => {
            let text = other
                .dyn_ref::<js_sys::Object>()
                .map(|object| String::from(object.to_string()))
                .unwrap_or_default();
            Renderable::Text(text)
        }
    }
}
