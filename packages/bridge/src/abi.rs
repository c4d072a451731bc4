//! Entry points in the shape the compiled module calls them.
//!
//! Group ids and text arrive as byte ranges in module memory; nodes arrive as
//! host handles. Each function decodes its arguments and forwards to the
//! matching [`Bridge`] entry point. Decoding faults are logged and dropped
//! like any other bridge fault.

use crate::entry::Bridge;
use crate::marshal::{read_str, read_str_list, LinearMemory, MarshalError, StrRef};
use crate::operators::Operator;
use crate::payload::Payload;
use domhook_dom::Document;
use tracing::warn;

fn decode<T>(operator: Operator, result: Result<T, MarshalError>) -> Option<T> {
    result
        .inspect_err(|error| {
            warn!(operator = %operator, error = %error, "Could not decode bridge arguments");
        })
        .ok()
}

/// `uInnerHTML(group_ptr, group_len, text_ptr, text_len)`
pub fn inner_html<D, M, Mem>(bridge: &mut Bridge<D, M>, memory: &Mem, group: StrRef, text: StrRef)
where
    D: Document,
    Mem: LinearMemory + ?Sized,
{
    let args = read_str(memory, group).and_then(|group| Ok((group, read_str(memory, text)?)));
    if let Some((group, text)) = decode(Operator::ReplaceContents, args) {
        bridge.inner_html(&group, Payload::text(text));
    }
}

/// `uInnerHTMLList(group_ptr, group_len, list_ptr, count)`
pub fn inner_html_list<D, M, Mem>(
    bridge: &mut Bridge<D, M>,
    memory: &Mem,
    group: StrRef,
    list_ptr: u32,
    count: u32,
) where
    D: Document,
    Mem: LinearMemory + ?Sized,
{
    let args = read_str(memory, group)
        .and_then(|group| Ok((group, read_str_list(memory, list_ptr, count)?)));
    if let Some((group, items)) = decode(Operator::ReplaceContents, args) {
        bridge.inner_html(&group, Payload::texts(items));
    }
}

/// `uAppendChild(group_ptr, group_len, node)`
pub fn append_child<D, M, Mem>(bridge: &mut Bridge<D, M>, memory: &Mem, group: StrRef, node: D::Node)
where
    D: Document,
    Mem: LinearMemory + ?Sized,
{
    if let Some(group) = decode(Operator::AppendChild, read_str(memory, group)) {
        bridge.append_child(&group, Payload::node(node));
    }
}

/// `uRemoveChild(group_ptr, group_len, node)`
pub fn remove_child<D, M, Mem>(bridge: &mut Bridge<D, M>, memory: &Mem, group: StrRef, node: D::Node)
where
    D: Document,
    Mem: LinearMemory + ?Sized,
{
    if let Some(group) = decode(Operator::RemoveChild, read_str(memory, group)) {
        bridge.remove_child(&group, Payload::node(node));
    }
}

/// `uReplaceChild(group_ptr, group_len, new_node, old_node)`
pub fn replace_child<D, M, Mem>(
    bridge: &mut Bridge<D, M>,
    memory: &Mem,
    group: StrRef,
    incoming: D::Node,
    outgoing: D::Node,
) where
    D: Document,
    Mem: LinearMemory + ?Sized,
{
    if let Some(group) = decode(Operator::ReplaceChild, read_str(memory, group)) {
        bridge.replace_child(&group, Payload::node(incoming), outgoing);
    }
}
