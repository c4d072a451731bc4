//! # JavaScript Glue
//!
//! Generates the loader and update functions for pages that host the module
//! with plain JavaScript instead of the wasm host crate.
//!
//! Only the update functions for the configured operators are emitted. The
//! generated functions follow the same contract as the Rust operators:
//!
//! - the group is resolved on every call and copied out of the live
//!   collection before any mutation,
//! - text lists are joined with a single space,
//! - each node is updated inside its own `try` so one failure never stops the
//!   rest of the group,
//! - placement across several nodes follows the configured
//!   [`MultiTargetPolicy`],
//! - calls made before instantiation completes are dropped with a warning.

use crate::config::{BridgeConfig, MalformedPayloadPolicy, MultiTargetPolicy};
use crate::operators::Operator;

struct Context {
    buffer: String,
}

impl Context {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn add_line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn add_block(&mut self, block: &str) {
        for line in block.lines() {
            self.add_line(line);
        }
        self.add_line("");
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Generate the JavaScript glue for `config`.
pub fn generate_glue(config: &BridgeConfig) -> String {
    let mut ctx = Context::new();
    let operators = dedup(&config.operators);

    ctx.add_line("// Generated by domhook. Do not edit.");
    ctx.add_line("let memory = null;");
    ctx.add_line("const decoder = new TextDecoder();");
    ctx.add_line("");

    ctx.add_block(READY_CHECK);
    ctx.add_block(READ_STR);
    if operators.contains(&Operator::ReplaceContents) {
        ctx.add_block(READ_STR_LIST);
    }
    ctx.add_block(RESOLVE);
    if operators.iter().any(|op| op.places_node()) {
        ctx.add_block(&placer(config.multi_target));
    }
    if operators.iter().any(|op| *op != Operator::ReplaceContents) {
        ctx.add_block(&node_payload(config.malformed_payload));
    }

    let mut imports = Vec::new();
    for operator in &operators {
        match operator {
            Operator::ReplaceContents => {
                ctx.add_block(INNER_HTML);
                imports.push("uInnerHTML");
                imports.push("uInnerHTMLList");
            }
            Operator::AppendChild => {
                ctx.add_block(APPEND_CHILD);
                imports.push(operator.import_name());
            }
            Operator::RemoveChild => {
                ctx.add_block(REMOVE_CHILD);
                imports.push(operator.import_name());
            }
            Operator::ReplaceChild => {
                ctx.add_block(REPLACE_CHILD);
                imports.push(operator.import_name());
            }
        }
    }

    ctx.add_line(&format!(
        "const importObject = {{ {}: {{ {} }} }};",
        js_key(&config.import_namespace),
        imports.join(", ")
    ));
    ctx.add_line("");
    ctx.add_line(&format!(
        "export const ready = WebAssembly.instantiateStreaming(fetch({}), importObject).then((obj) => {{",
        js_string(&config.module_path)
    ));
    ctx.add_line("  const wsx = obj.instance.exports;");
    ctx.add_line("  memory = wsx.memory;");
    ctx.add_line("  return wsx;");
    ctx.add_line("});");

    ctx.get_output()
}

fn dedup(operators: &[Operator]) -> Vec<Operator> {
    let mut out = Vec::new();
    for operator in operators {
        if !out.contains(operator) {
            out.push(*operator);
        }
    }
    out
}

/// Quote a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn js_key(value: &str) -> String {
    let is_identifier = !value.is_empty()
        && !value.starts_with(|c: char| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        value.to_string()
    } else {
        js_string(value)
    }
}

fn placer(policy: MultiTargetPolicy) -> String {
    match policy {
        MultiTargetPolicy::ClonePerTarget => PLACE_CLONE.to_string(),
        MultiTargetPolicy::SingletonOnly => PLACE_SINGLETON.to_string(),
    }
}

fn node_payload(policy: MalformedPayloadPolicy) -> String {
    match policy {
        MalformedPayloadPolicy::Coerce => NODE_COERCE.to_string(),
        MalformedPayloadPolicy::FaultFast => NODE_FAULT_FAST.to_string(),
    }
}

const READY_CHECK: &str = r#"function ready(name) {
  if (memory === null) {
    console.warn(`domhook: ${name} called before the module is ready`);
    return false;
  }
  return true;
}"#;

const READ_STR: &str = r#"function readStr(ptr, len) {
  return decoder.decode(new Uint8Array(memory.buffer, ptr, len));
}"#;

const READ_STR_LIST: &str = r#"function readStrList(ptr, count) {
  const view = new DataView(memory.buffer);
  const out = [];
  for (let i = 0; i < count; i++) {
    out.push(readStr(view.getUint32(ptr + i * 8, true), view.getUint32(ptr + i * 8 + 4, true)));
  }
  return out;
}"#;

const RESOLVE: &str = r#"function resolve(id) {
  return Array.from(document.getElementsByClassName(id));
}

function each(name, es, apply) {
  for (let i = 0; i < es.length; i++) {
    try {
      apply(es[i], i);
    } catch (e) {
      console.debug(`domhook: ${name} skipped node ${i}`, e);
    }
  }
}"#;

const PLACE_CLONE: &str = r#"function placer(name, es, node) {
  let placed = false;
  return (apply) => {
    apply(placed ? node.cloneNode(true) : node);
    placed = true;
  };
}"#;

const PLACE_SINGLETON: &str = r#"function placer(name, es, node) {
  if (es.length > 1) {
    console.warn(`domhook: ${name} needs a single target, group has ${es.length}`);
    return null;
  }
  return (apply) => apply(node);
}"#;

const NODE_COERCE: &str = r#"function textOf(item) {
  return item instanceof Node ? item.textContent : String(item);
}

function nodePayload(name, update) {
  if (update instanceof Node) return update;
  if (Array.isArray(update) && update.length === 1 && update[0] instanceof Node) return update[0];
  return document.createTextNode(Array.isArray(update) ? update.map(textOf).join(' ') : textOf(update));
}"#;

const NODE_FAULT_FAST: &str = r#"function nodePayload(name, update) {
  if (update instanceof Node) return update;
  console.warn(`domhook: ${name} expects a node`);
  return null;
}"#;

const INNER_HTML: &str = r#"function uInnerHTML(idPtr, idLen, ptr, len) {
  if (!ready("uInnerHTML")) return;
  const update = readStr(ptr, len);
  each("uInnerHTML", resolve(readStr(idPtr, idLen)), (e) => { e.innerHTML = update; });
}

function uInnerHTMLList(idPtr, idLen, listPtr, count) {
  if (!ready("uInnerHTMLList")) return;
  const update = readStrList(listPtr, count).join(' ');
  each("uInnerHTMLList", resolve(readStr(idPtr, idLen)), (e) => { e.innerHTML = update; });
}"#;

const APPEND_CHILD: &str = r#"function uAppendChild(idPtr, idLen, update) {
  if (!ready("uAppendChild")) return;
  const es = resolve(readStr(idPtr, idLen));
  const node = nodePayload("uAppendChild", update);
  if (node === null) return;
  const place = placer("uAppendChild", es, node);
  if (place === null) return;
  each("uAppendChild", es, (e) => place((n) => e.appendChild(n)));
}"#;

const REMOVE_CHILD: &str = r#"function uRemoveChild(idPtr, idLen, update) {
  if (!ready("uRemoveChild")) return;
  const es = resolve(readStr(idPtr, idLen));
  const node = nodePayload("uRemoveChild", update);
  if (node === null) return;
  each("uRemoveChild", es, (e) => e.removeChild(node));
}"#;

const REPLACE_CHILD: &str = r#"function uReplaceChild(idPtr, idLen, update, outgoing) {
  if (!ready("uReplaceChild")) return;
  const es = resolve(readStr(idPtr, idLen));
  const node = nodePayload("uReplaceChild", update);
  if (node === null) return;
  const place = placer("uReplaceChild", es, node);
  if (place === null) return;
  each("uReplaceChild", es, (e) => {
    if (outgoing.parentNode !== e) throw new Error("not a child");
    place((n) => e.replaceChild(n, outgoing));
  });
}"#;
