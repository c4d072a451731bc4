//! Canonical values for update payloads.
//!
//! A scalar payload is already canonical. A sequence collapses into a single
//! string: the textual form of each item, in order, separated by one ASCII
//! space. Nothing is escaped; the caller owns the safety of what it sends.

use crate::config::MalformedPayloadPolicy;
use crate::error::{BridgeError, BridgeResult};
use crate::operators::Operator;
use crate::payload::{Payload, Renderable};
use domhook_dom::Document;

pub const SEPARATOR: &str = " ";

/// Join text parts with a single space. An empty input yields `""`.
pub fn join_text<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// Normalize a payload to its canonical value.
///
/// Scalars pass through untouched. Sequences become `Renderable::Text`.
pub fn normalize<D: Document>(
    doc: &D,
    payload: Payload<D::Node>,
    policy: MalformedPayloadPolicy,
    operator: Operator,
) -> BridgeResult<Renderable<D::Node>> {
    match payload {
        Payload::Scalar(item) => Ok(item),
        Payload::Sequence(items) => {
            let parts = items
                .iter()
                .map(|item| textual(doc, item, policy, operator))
                .collect::<BridgeResult<Vec<_>>>()?;
            Ok(Renderable::Text(join_text(parts)))
        }
    }
}

/// Textual form of one renderable.
///
/// Nodes only have a textual form under the coercing policy, where they
/// contribute their text content.
pub fn textual<D: Document>(
    doc: &D,
    item: &Renderable<D::Node>,
    policy: MalformedPayloadPolicy,
    operator: Operator,
) -> BridgeResult<String> {
    match item {
        Renderable::Text(text) => Ok(text.clone()),
        Renderable::Number(value) => Ok(value.to_string()),
        Renderable::Node(node) => match policy {
            MalformedPayloadPolicy::Coerce => Ok(doc.text_content(node)),
            MalformedPayloadPolicy::FaultFast => Err(BridgeError::MalformedPayload {
                operator,
                reason: "node where text was expected".to_string(),
            }),
        },
    }
}
