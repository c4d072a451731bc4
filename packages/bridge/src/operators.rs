//! # Mutation Operators
//!
//! Four operators, each applied uniformly to every node of a resolved group:
//!
//! | Operator | Effect per node |
//! |---|---|
//! | `ReplaceContents` | content replaced by the canonical text (raw markup) |
//! | `AppendChild` | payload node appended as last child |
//! | `RemoveChild` | payload node removed from the node's children |
//! | `ReplaceChild` | caller-named outgoing child replaced by the incoming node |
//!
//! ## Skeleton
//!
//! Resolve the group, normalize the payload, then visit each node in
//! resolution order. A structural failure on one node is recorded in the
//! [`ApplyReport`] and the operator moves on to the next node.
//!
//! ## Placement across a group
//!
//! A node has one parent, so placing one handle under several targets needs a
//! policy ([`MultiTargetPolicy`]):
//!
//! - `ClonePerTarget`: the first successful placement uses the caller's
//!   handle, every later placement in the same call uses a deep clone. A
//!   target is checked before anything is cloned for it, so targets that
//!   cannot take the node cost no allocation.
//! - `SingletonOnly`: placing into a group of more than one node fails with
//!   `AmbiguousTarget` before anything is touched.
//!
//! ## Payload shape
//!
//! Node operators expect a single node. Under `MalformedPayloadPolicy::Coerce`
//! anything else is normalized to text and each target that accepts it gets a
//! fresh text node (a one-element sequence holding a node is taken as that
//! node). Under `FaultFast` the call fails with `MalformedPayload`.

use crate::config::{BridgeConfig, MalformedPayloadPolicy, MultiTargetPolicy};
use crate::error::{BridgeError, BridgeResult};
use crate::normalizer::{normalize, textual};
use crate::payload::{Payload, Renderable};
use crate::resolver::{resolve, ResolvedGroup};
use domhook_dom::{Document, DomError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    ReplaceContents,
    AppendChild,
    RemoveChild,
    ReplaceChild,
}

impl Operator {
    pub fn all() -> Vec<Operator> {
        vec![
            Operator::ReplaceContents,
            Operator::AppendChild,
            Operator::RemoveChild,
            Operator::ReplaceChild,
        ]
    }

    /// Name of the import the module calls for this operator.
    pub fn import_name(&self) -> &'static str {
        match self {
            Operator::ReplaceContents => "uInnerHTML",
            Operator::AppendChild => "uAppendChild",
            Operator::RemoveChild => "uRemoveChild",
            Operator::ReplaceChild => "uReplaceChild",
        }
    }

    /// Whether the operator places a node under its targets.
    pub fn places_node(&self) -> bool {
        matches!(self, Operator::AppendChild | Operator::ReplaceChild)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::ReplaceContents => "ReplaceContents",
            Operator::AppendChild => "AppendChild",
            Operator::RemoveChild => "RemoveChild",
            Operator::ReplaceChild => "ReplaceChild",
        };
        f.write_str(name)
    }
}

/// One requested update, carrying its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<N> {
    ReplaceContents(Payload<N>),
    AppendChild(Payload<N>),
    RemoveChild(Payload<N>),
    ReplaceChild { incoming: Payload<N>, outgoing: N },
}

impl<N> Mutation<N> {
    pub fn operator(&self) -> Operator {
        match self {
            Mutation::ReplaceContents(_) => Operator::ReplaceContents,
            Mutation::AppendChild(_) => Operator::AppendChild,
            Mutation::RemoveChild(_) => Operator::RemoveChild,
            Mutation::ReplaceChild { .. } => Operator::ReplaceChild,
        }
    }
}

/// A node the operator could not mutate.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedNode {
    /// Position of the node in the resolved group.
    pub index: usize,
    pub error: DomError,
}

/// Outcome of applying one operator to one group.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub operator: Operator,
    pub group: String,
    pub resolved: usize,
    pub applied: usize,
    pub skipped: Vec<SkippedNode>,
}

impl ApplyReport {
    fn new<N>(operator: Operator, group: &ResolvedGroup<N>) -> Self {
        Self {
            operator,
            group: group.group().to_string(),
            resolved: group.len(),
            applied: 0,
            skipped: Vec::new(),
        }
    }

    fn record(&mut self, index: usize, result: Result<(), DomError>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(error) => {
                debug!(operator = %self.operator, group = %self.group, index, error = %error, "Skipping node");
                self.skipped.push(SkippedNode { index, error });
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Apply `mutation` to every node currently in `group`.
///
/// Returns `Err` only for faults that stop the call before any node is
/// touched. Per-node failures are listed in the report.
#[instrument(skip(doc, mutation, config), fields(operator = %mutation.operator()))]
pub fn apply<D: Document>(
    doc: &mut D,
    group: &str,
    mutation: Mutation<D::Node>,
    config: &BridgeConfig,
) -> BridgeResult<ApplyReport> {
    let operator = mutation.operator();
    let targets = resolve(doc, group);
    let mut report = ApplyReport::new(operator, &targets);

    if operator.places_node()
        && config.multi_target == MultiTargetPolicy::SingletonOnly
        && targets.len() > 1
    {
        return Err(BridgeError::AmbiguousTarget {
            operator,
            group: group.to_string(),
            count: targets.len(),
        });
    }

    match mutation {
        Mutation::ReplaceContents(payload) => {
            let policy = config.malformed_payload;
            let canonical = normalize(doc, payload, policy, operator)?;
            let markup = textual(doc, &canonical, policy, operator)?;
            for (index, target) in targets.iter().enumerate() {
                report.record(index, doc.set_inner_html(target, &markup));
            }
        }
        Mutation::AppendChild(payload) => {
            let incoming = node_payload(doc, payload, config, operator)?;
            let mut placer = Placer::new(incoming, config.multi_target);
            for (index, target) in targets.iter().enumerate() {
                let result = doc.check_parent(target).and_then(|()| {
                    placer.place(doc, |doc, node| doc.append_child(target, node))
                });
                report.record(index, result);
            }
        }
        Mutation::RemoveChild(payload) => {
            let incoming = node_payload(doc, payload, config, operator)?;
            if let Some(child) = incoming.into_node(doc, targets.is_empty())? {
                for (index, target) in targets.iter().enumerate() {
                    report.record(index, doc.remove_child(target, &child));
                }
            }
        }
        Mutation::ReplaceChild { incoming, outgoing } => {
            let incoming = node_payload(doc, incoming, config, operator)?;
            let mut placer = Placer::new(incoming, config.multi_target);
            for (index, target) in targets.iter().enumerate() {
                let result = doc.check_child_of(target, &outgoing).and_then(|()| {
                    placer.place(doc, |doc, node| doc.replace_child(target, node, &outgoing))
                });
                report.record(index, result);
            }
        }
    }

    if !report.is_complete() {
        warn!(
            operator = %operator,
            group,
            applied = report.applied,
            skipped = report.skipped.len(),
            "Operator skipped nodes"
        );
    }
    debug!(operator = %operator, group, resolved = report.resolved, applied = report.applied, "Operator applied");
    Ok(report)
}

/// The node a child operator works with, or the text a node is made from.
enum Incoming<N> {
    Node(N),
    Text(String),
}

impl<N> Incoming<N> {
    /// The node itself, creating the text node unless `skip` is set.
    fn into_node<D: Document<Node = N>>(self, doc: &mut D, skip: bool) -> BridgeResult<Option<N>> {
        match self {
            Incoming::Node(node) => Ok(Some(node)),
            Incoming::Text(_) if skip => Ok(None),
            Incoming::Text(text) => Ok(Some(doc.create_text_node(&text)?)),
        }
    }
}

/// Extract the single node a child operator works with.
///
/// Shape faults surface here, before any target is touched. Text is only
/// turned into a node once a target is known to accept it.
fn node_payload<D: Document>(
    doc: &D,
    payload: Payload<D::Node>,
    config: &BridgeConfig,
    operator: Operator,
) -> BridgeResult<Incoming<D::Node>> {
    let policy = config.malformed_payload;
    let payload = match payload {
        Payload::Scalar(Renderable::Node(node)) => return Ok(Incoming::Node(node)),
        other if policy == MalformedPayloadPolicy::FaultFast => {
            return Err(BridgeError::MalformedPayload {
                operator,
                reason: format!("expected a single node, got {}", other.shape()),
            });
        }
        Payload::Sequence(mut items) if items.len() == 1 && matches!(items[0], Renderable::Node(_)) => {
            match items.pop() {
                Some(Renderable::Node(node)) => return Ok(Incoming::Node(node)),
                _ => Payload::Sequence(Vec::new()),
            }
        }
        other => other,
    };

    debug!(operator = %operator, shape = %payload.shape(), "Coercing payload to a text node");
    let canonical = normalize(doc, payload, policy, operator)?;
    Ok(Incoming::Text(textual(doc, &canonical, policy, operator)?))
}

/// Hands out the caller's node for the first placement and deep clones for
/// every later one. Text payloads get a fresh text node per placement.
struct Placer<N> {
    incoming: Incoming<N>,
    policy: MultiTargetPolicy,
    placed: bool,
}

impl<N: Clone> Placer<N> {
    fn new(incoming: Incoming<N>, policy: MultiTargetPolicy) -> Self {
        Self {
            incoming,
            policy,
            placed: false,
        }
    }

    fn place<D, F>(&mut self, doc: &mut D, op: F) -> Result<(), DomError>
    where
        D: Document<Node = N>,
        F: FnOnce(&mut D, &N) -> Result<(), DomError>,
    {
        let result = match &self.incoming {
            Incoming::Node(node)
                if self.placed && self.policy == MultiTargetPolicy::ClonePerTarget =>
            {
                let copy = doc.clone_node(node)?;
                op(doc, &copy)
            }
            Incoming::Node(node) => op(doc, node),
            Incoming::Text(text) => {
                let fresh = doc.create_text_node(text)?;
                op(doc, &fresh)
            }
        };
        if result.is_ok() {
            self.placed = true;
        }
        result
    }
}
