//! The instantiated module as seen from the host: its exports object and its
//! linear memory.

use domhook_bridge::{BridgeError, BridgeResult, LinearMemory, MarshalError, ModuleExports, Primitive};
use js_sys::{Array, Function, Object, Reflect, Uint8Array, WebAssembly};
use wasm_bindgen::{JsCast, JsValue};

/// View of the module's exported `memory`.
///
/// The underlying buffer is looked up on every read since it is replaced
/// whenever the module grows its memory.
#[derive(Debug, Clone)]
pub struct JsMemory {
    memory: WebAssembly::Memory,
}

impl JsMemory {
    pub fn new(memory: WebAssembly::Memory) -> Self {
        Self { memory }
    }
}

impl LinearMemory for JsMemory {
    fn read(&self, offset: u32, len: u32) -> Result<Vec<u8>, MarshalError> {
        let bytes = Uint8Array::new(&self.memory.buffer());
        let size = bytes.length();
        let out_of_bounds = MarshalError::OutOfBounds {
            offset,
            len,
            size: size as u64,
        };
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(bytes.subarray(offset, end).to_vec()),
            _ => Err(out_of_bounds),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserModule {
    exports: Object,
    memory: JsMemory,
}

impl BrowserModule {
    /// Wrap an instance's exports. The module must export its memory.
    pub fn from_exports(exports: Object) -> BridgeResult<Self> {
        let memory = Reflect::get(&exports, &JsValue::from_str("memory"))
            .ok()
            .and_then(|value| value.dyn_into::<WebAssembly::Memory>().ok())
            .ok_or_else(|| BridgeError::MissingExport("memory".to_string()))?;
        Ok(Self {
            exports,
            memory: JsMemory::new(memory),
        })
    }

    pub fn memory(&self) -> JsMemory {
        self.memory.clone()
    }

    fn export(&self, name: &str) -> BridgeResult<Function> {
        Reflect::get(&self.exports, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| BridgeError::MissingExport(name.to_string()))
    }
}

impl ModuleExports for BrowserModule {
    fn call(&self, name: &str, args: &[Primitive]) -> BridgeResult<Primitive> {
        let function = self.export(name)?;
        let js_args: Array = args.iter().map(primitive_to_js).collect();
        let result = function
            .apply(&JsValue::UNDEFINED, &js_args)
            .map_err(|error| BridgeError::ExportCall {
                name: name.to_string(),
                message: js_message(&error),
            })?;
        primitive_from_js(&result).ok_or_else(|| BridgeError::ExportCall {
            name: name.to_string(),
            message: format!("unsupported return value {:?}", result),
        })
    }
}

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub fn primitive_to_js(value: &Primitive) -> JsValue {
    match value {
        Primitive::Unit => JsValue::UNDEFINED,
        Primitive::Int(value) if (*value as f64).abs() <= MAX_SAFE_INTEGER => {
            JsValue::from_f64(*value as f64)
        }
        Primitive::Int(value) => js_sys::BigInt::from(*value).into(),
        Primitive::Float(value) => JsValue::from_f64(*value),
        Primitive::Text(text) => JsValue::from_str(text),
    }
}

/// Integral numbers come back as `Int`, everything else numeric as `Float`.
pub fn primitive_from_js(value: &JsValue) -> Option<Primitive> {
    if value.is_undefined() || value.is_null() {
        return Some(Primitive::Unit);
    }
    if let Some(text) = value.as_string() {
        return Some(Primitive::Text(text));
    }
    if let Some(number) = value.as_f64() {
        if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
            return Some(Primitive::Int(number as i64));
        }
        return Some(Primitive::Float(number));
    }
    if let Some(flag) = value.as_bool() {
        return Some(Primitive::Int(flag as i64));
    }
    let big = value.dyn_ref::<js_sys::BigInt>()?;
    let digits = big.to_string(10).ok()?;
    String::from(digits).parse().ok().map(Primitive::Int)
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
