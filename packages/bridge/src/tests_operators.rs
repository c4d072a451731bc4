/// Operator tests - per-node effects, group iteration and payload policies
use crate::*;
use domhook_dom::{Document, DomError, NodeId, NodeKind, VirtualDocument};

#[cfg(test)]
mod operator_tests {
    use super::*;

    fn add_to_group(doc: &mut VirtualDocument, tag: &str, group: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.add_class(node, group).unwrap();
        let root = doc.root();
        doc.append_child(&root, &node).unwrap();
        node
    }

    fn coerce() -> BridgeConfig {
        BridgeConfig::default()
    }

    fn fault_fast() -> BridgeConfig {
        BridgeConfig::default().with_malformed_payload(MalformedPayloadPolicy::FaultFast)
    }

    fn singleton() -> BridgeConfig {
        BridgeConfig::default().with_multi_target(MultiTargetPolicy::SingletonOnly)
    }

    #[test]
    fn test_replace_contents_overwrites_every_node() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "p", "msg");
        let b = add_to_group(&mut doc, "p", "msg");
        let old = doc.create_text("old");
        doc.append_child(&a, &old).unwrap();

        let report = apply(
            &mut doc,
            "msg",
            Mutation::ReplaceContents(Payload::text("<em>new</em>")),
            &coerce(),
        )
        .unwrap();

        assert_eq!(report.resolved, 2);
        assert_eq!(report.applied, 2);
        assert!(report.is_complete());
        assert_eq!(doc.inner_html(a), "<em>new</em>");
        assert_eq!(doc.inner_html(b), "<em>new</em>");
        assert_eq!(doc.parent(old), None);
    }

    #[test]
    fn test_replace_contents_with_number() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "span", "count");

        apply(&mut doc, "count", Mutation::ReplaceContents(Payload::number(42.0)), &coerce()).unwrap();

        assert_eq!(doc.inner_html(a), "42");
    }

    #[test]
    fn test_replace_contents_node_payload_by_policy() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "div", "msg");
        let source = doc.create_text("from node");

        apply(&mut doc, "msg", Mutation::ReplaceContents(Payload::node(source)), &coerce()).unwrap();
        assert_eq!(doc.inner_html(a), "from node");

        let err = apply(
            &mut doc,
            "msg",
            Mutation::ReplaceContents(Payload::node(source)),
            &fault_fast(),
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::MalformedPayload { operator: Operator::ReplaceContents, .. }));
        assert_eq!(doc.inner_html(a), "from node");
    }

    #[test]
    fn test_replace_contents_uses_snapshot() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "div", "msg");
        let b = add_to_group(&mut doc, "div", "msg");
        // Nested group member whose parent gets overwritten first: still in the snapshot.
        let nested = doc.create_element("span");
        doc.add_class(nested, "msg").unwrap();
        doc.append_child(&a, &nested).unwrap();

        let report = apply(&mut doc, "msg", Mutation::ReplaceContents(Payload::text("x")), &coerce())
            .unwrap();

        assert_eq!(report.resolved, 3);
        assert_eq!(report.applied, 3);
        assert_eq!(doc.inner_html(a), "x");
        assert_eq!(doc.inner_html(b), "x");
        assert!(!doc.is_attached(nested));
        assert_eq!(doc.inner_html(nested), "x");
    }

    #[test]
    fn test_append_child_single_target_uses_handle() {
        let mut doc = VirtualDocument::new();
        let list = add_to_group(&mut doc, "ul", "list");
        let item = doc.create_element("li");

        let report = apply(&mut doc, "list", Mutation::AppendChild(Payload::node(item)), &coerce())
            .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(doc.children(list), &[item]);
    }

    #[test]
    fn test_append_child_clones_for_later_targets() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "ul", "list");
        let b = add_to_group(&mut doc, "ul", "list");
        let c = add_to_group(&mut doc, "ul", "list");
        let item = doc.create_element("li");
        let label = doc.create_text("entry");
        doc.append_child(&item, &label).unwrap();

        let report = apply(&mut doc, "list", Mutation::AppendChild(Payload::node(item)), &coerce())
            .unwrap();

        assert_eq!(report.applied, 3);
        assert_eq!(doc.children(a), &[item]);
        for target in [b, c] {
            let children = doc.children(target);
            assert_eq!(children.len(), 1);
            assert_ne!(children[0], item);
            assert_eq!(doc.outer_html(children[0]), "<li>entry</li>");
        }
    }

    #[test]
    fn test_append_child_singleton_policy_rejects_groups() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "ul", "list");
        let b = add_to_group(&mut doc, "ul", "list");
        let item = doc.create_element("li");

        let err = apply(&mut doc, "list", Mutation::AppendChild(Payload::node(item)), &singleton())
            .unwrap_err();

        assert!(matches!(
            err,
            BridgeError::AmbiguousTarget { operator: Operator::AppendChild, count: 2, .. }
        ));
        assert!(doc.children(a).is_empty());
        assert!(doc.children(b).is_empty());
        assert_eq!(doc.parent(item), None);
    }

    #[test]
    fn test_append_child_singleton_policy_allows_one() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "ul", "list");
        let item = doc.create_element("li");

        apply(&mut doc, "list", Mutation::AppendChild(Payload::node(item)), &singleton()).unwrap();

        assert_eq!(doc.children(a), &[item]);
    }

    #[test]
    fn test_singleton_policy_does_not_restrict_contents_or_removal() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "div", "g");
        let b = add_to_group(&mut doc, "div", "g");
        let child = doc.create_element("span");
        doc.append_child(&b, &child).unwrap();

        let report = apply(&mut doc, "g", Mutation::RemoveChild(Payload::node(child)), &singleton())
            .unwrap();
        assert_eq!(report.applied, 1);

        let report = apply(&mut doc, "g", Mutation::ReplaceContents(Payload::text("t")), &singleton())
            .unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(doc.inner_html(a), "t");
    }

    #[test]
    fn test_append_child_text_payload_by_policy() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "p", "log");

        apply(&mut doc, "log", Mutation::AppendChild(Payload::texts(["line", "one"])), &coerce())
            .unwrap();
        assert_eq!(doc.inner_html(a), "line one");
        let appended = doc.children(a)[0];
        assert_eq!(
            doc.kind(appended),
            Some(&NodeKind::Text { content: "line one".to_string() })
        );

        let err = apply(&mut doc, "log", Mutation::AppendChild(Payload::text("two")), &fault_fast())
            .unwrap_err();
        assert!(matches!(err, BridgeError::MalformedPayload { operator: Operator::AppendChild, .. }));
        assert_eq!(doc.children(a).len(), 1);
    }

    #[test]
    fn test_single_node_sequence_is_taken_as_node() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "ul", "list");
        let item = doc.create_element("li");

        apply(
            &mut doc,
            "list",
            Mutation::AppendChild(Payload::sequence([Renderable::Node(item)])),
            &coerce(),
        )
        .unwrap();

        assert_eq!(doc.children(a), &[item]);
    }

    #[test]
    fn test_append_child_cycle_is_skipped() {
        let mut doc = VirtualDocument::new();
        let outer = add_to_group(&mut doc, "div", "box");
        let other = add_to_group(&mut doc, "div", "box");

        // Appending a group member under itself is invalid for that member only.
        let report = apply(&mut doc, "box", Mutation::AppendChild(Payload::node(outer)), &coerce())
            .unwrap();

        assert_eq!(report.resolved, 2);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 0);
        assert!(matches!(report.skipped[0].error, DomError::HierarchyRequest { .. }));
        assert_eq!(doc.children(other), &[outer]);
    }

    #[test]
    fn test_remove_child_skips_non_parents() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "div", "g");
        let b = add_to_group(&mut doc, "div", "g");
        let c = add_to_group(&mut doc, "div", "g");
        let child = doc.create_element("span");
        doc.append_child(&b, &child).unwrap();

        let report = apply(&mut doc, "g", Mutation::RemoveChild(Payload::node(child)), &coerce())
            .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(
            report.skipped.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.error, DomError::NotAChild { .. })));
        assert!(doc.children(a).is_empty());
        assert!(doc.children(b).is_empty());
        assert!(doc.children(c).is_empty());
    }

    #[test]
    fn test_replace_child_uses_explicit_outgoing() {
        let mut doc = VirtualDocument::new();
        let list = add_to_group(&mut doc, "ul", "list");
        let first = doc.create_element("li");
        let second = doc.create_element("li");
        doc.append_child(&list, &first).unwrap();
        doc.append_child(&list, &second).unwrap();
        let replacement = doc.create_element("li");

        let report = apply(
            &mut doc,
            "list",
            Mutation::ReplaceChild {
                incoming: Payload::node(replacement),
                outgoing: first,
            },
            &coerce(),
        )
        .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(doc.children(list), &[replacement, second]);
        assert_eq!(doc.parent(first), None);
    }

    #[test]
    fn test_replace_child_only_touches_holder() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "ul", "list");
        let b = add_to_group(&mut doc, "ul", "list");
        let old = doc.create_element("li");
        doc.append_child(&b, &old).unwrap();
        let replacement = doc.create_element("li");

        let report = apply(
            &mut doc,
            "list",
            Mutation::ReplaceChild {
                incoming: Payload::node(replacement),
                outgoing: old,
            },
            &coerce(),
        )
        .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped[0].index, 0);
        assert!(doc.children(a).is_empty());
        // The first successful placement uses the caller's handle, not a clone.
        assert_eq!(doc.children(b), &[replacement]);
    }

    #[test]
    fn test_replace_child_singleton_policy_rejects_groups() {
        let mut doc = VirtualDocument::new();
        add_to_group(&mut doc, "ul", "list");
        let b = add_to_group(&mut doc, "ul", "list");
        let old = doc.create_element("li");
        doc.append_child(&b, &old).unwrap();
        let replacement = doc.create_element("li");

        let err = apply(
            &mut doc,
            "list",
            Mutation::ReplaceChild {
                incoming: Payload::node(replacement),
                outgoing: old,
            },
            &singleton(),
        )
        .unwrap_err();

        assert!(matches!(err, BridgeError::AmbiguousTarget { operator: Operator::ReplaceChild, .. }));
        assert_eq!(doc.children(b), &[old]);
    }

    #[test]
    fn test_replace_child_clones_only_for_holders() {
        let mut doc = VirtualDocument::new();
        let a = add_to_group(&mut doc, "ul", "list");
        add_to_group(&mut doc, "ul", "list");
        add_to_group(&mut doc, "ul", "list");
        let old = doc.create_element("li");
        doc.append_child(&a, &old).unwrap();
        let replacement = doc.create_element("li");
        let label = doc.create_text("new");
        doc.append_child(&replacement, &label).unwrap();
        let before = doc.len();

        let report = apply(
            &mut doc,
            "list",
            Mutation::ReplaceChild {
                incoming: Payload::node(replacement),
                outgoing: old,
            },
            &coerce(),
        )
        .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.error, DomError::NotAChild { .. })));
        assert_eq!(doc.children(a), &[replacement]);
        assert_eq!(doc.len(), before);
    }

    #[test]
    fn test_replace_child_text_payload_only_for_holders() {
        let mut doc = VirtualDocument::new();
        add_to_group(&mut doc, "p", "line");
        let b = add_to_group(&mut doc, "p", "line");
        add_to_group(&mut doc, "p", "line");
        let old = doc.create_text("old");
        doc.append_child(&b, &old).unwrap();
        let before = doc.len();

        let report = apply(
            &mut doc,
            "line",
            Mutation::ReplaceChild {
                incoming: Payload::text("new"),
                outgoing: old,
            },
            &coerce(),
        )
        .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(doc.inner_html(b), "new");
        assert_eq!(doc.len(), before + 1);
    }

    #[test]
    fn test_failed_append_allocates_nothing() {
        let mut doc = VirtualDocument::new();
        let wrapper = add_to_group(&mut doc, "div", "outer");
        for _ in 0..3 {
            let inner = doc.create_element("div");
            doc.add_class(inner, "inner").unwrap();
            doc.append_child(&wrapper, &inner).unwrap();
        }
        let before = doc.len();

        // Every target sits inside the payload node.
        let report = apply(&mut doc, "inner", Mutation::AppendChild(Payload::node(wrapper)), &coerce())
            .unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped.len(), 3);
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.error, DomError::HierarchyRequest { .. })));
        assert_eq!(doc.len(), before);
    }

    #[test]
    fn test_repeated_replace_contents_keeps_document_size() {
        let mut doc = VirtualDocument::new();
        add_to_group(&mut doc, "div", "msg");
        add_to_group(&mut doc, "div", "msg");
        let config = coerce();

        apply(&mut doc, "msg", Mutation::ReplaceContents(Payload::text("same")), &config).unwrap();
        let before = doc.len();
        for _ in 0..1000 {
            apply(&mut doc, "msg", Mutation::ReplaceContents(Payload::text("same")), &config).unwrap();
        }

        assert_eq!(doc.len(), before);
    }

    #[test]
    fn test_empty_group_is_noop_for_every_operator() {
        let mut doc = VirtualDocument::new();
        let node = doc.create_element("li");
        let before = doc.len();

        let mutations = vec![
            Mutation::ReplaceContents(Payload::text("x")),
            Mutation::AppendChild(Payload::node(node)),
            Mutation::RemoveChild(Payload::node(node)),
            Mutation::ReplaceChild {
                incoming: Payload::node(node),
                outgoing: node,
            },
        ];
        for mutation in mutations {
            let report = apply(&mut doc, "nothing", mutation, &singleton()).unwrap();
            assert_eq!(report.resolved, 0);
            assert_eq!(report.applied, 0);
        }

        assert_eq!(doc.len(), before);
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(Operator::ReplaceContents.import_name(), "uInnerHTML");
        assert_eq!(Operator::ReplaceChild.to_string(), "ReplaceChild");
        assert!(Operator::AppendChild.places_node());
        assert!(!Operator::RemoveChild.places_node());
    }
}
