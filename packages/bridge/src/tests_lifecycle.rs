/// Lifecycle tests - readiness gate, export calls and module-facing entry points
use crate::marshal::TestMemory;
use crate::*;
use domhook_dom::{Document, NodeId, VirtualDocument};
use futures::executor::block_on;
use std::cell::{Cell, RefCell};

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[derive(Debug)]
    struct MockModule;

    impl ModuleExports for MockModule {
        fn call(&self, name: &str, args: &[Primitive]) -> BridgeResult<Primitive> {
            match name {
                "parse_int_expr" => {
                    let text = args.first().and_then(|a| a.as_str()).ok_or_else(|| {
                        BridgeError::ExportCall {
                            name: name.to_string(),
                            message: "expected a text argument".to_string(),
                        }
                    })?;
                    text.trim()
                        .parse::<i64>()
                        .map(Primitive::Int)
                        .map_err(|e| BridgeError::ExportCall {
                            name: name.to_string(),
                            message: e.to_string(),
                        })
                }
                _ => Err(BridgeError::MissingExport(name.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct MockLoader {
        fail: bool,
        calls: Cell<usize>,
        paths: RefCell<Vec<String>>,
    }

    impl ModuleLoader for MockLoader {
        type Module = MockModule;

        async fn load(&self, path: &str) -> BridgeResult<MockModule> {
            self.calls.set(self.calls.get() + 1);
            self.paths.borrow_mut().push(path.to_string());
            if self.fail {
                Err(BridgeError::Load {
                    path: path.to_string(),
                    message: "404 Not Found".to_string(),
                })
            } else {
                Ok(MockModule)
            }
        }
    }

    fn bridge_with_group(group: &str) -> (Bridge<VirtualDocument, MockModule>, NodeId) {
        let mut doc = VirtualDocument::new();
        let node = doc.create_element("div");
        doc.add_class(node, group).unwrap();
        let root = doc.root();
        doc.append_child(&root, &node).unwrap();
        (Bridge::new(doc, BridgeConfig::default()), node)
    }

    #[test]
    fn test_entry_points_before_ready_do_nothing() {
        let (mut bridge, node) = bridge_with_group("msg");

        bridge.inner_html("msg", Payload::text("hello"));

        assert!(!bridge.is_ready());
        assert_eq!(bridge.document().inner_html(node), "");
        assert!(matches!(
            bridge.try_dispatch("msg", Mutation::ReplaceContents(Payload::text("hello"))),
            Err(BridgeError::NotReady)
        ));
    }

    #[test]
    fn test_initialize_opens_the_gate() {
        let (mut bridge, node) = bridge_with_group("msg");
        let loader = MockLoader::default();

        block_on(bridge.initialize(&loader)).unwrap();
        bridge.inner_html("msg", Payload::text("hello"));

        assert!(bridge.is_ready());
        assert_eq!(bridge.document().inner_html(node), "hello");
        assert_eq!(*loader.paths.borrow(), vec!["./pkg/bs.wasm".to_string()]);
    }

    #[test]
    fn test_initialize_only_once() {
        let (mut bridge, _) = bridge_with_group("msg");
        let loader = MockLoader::default();

        block_on(bridge.initialize(&loader)).unwrap();
        let err = block_on(bridge.initialize(&loader)).unwrap_err();

        assert!(matches!(err, BridgeError::AlreadyInitialized));
        assert_eq!(loader.calls.get(), 1);
        assert!(matches!(bridge.install(MockModule), Err(BridgeError::AlreadyInitialized)));
    }

    #[test]
    fn test_failed_load_keeps_bridge_uninitialized() {
        let (mut bridge, node) = bridge_with_group("msg");
        let failing = MockLoader {
            fail: true,
            ..Default::default()
        };

        let err = block_on(bridge.initialize(&failing)).unwrap_err();
        assert!(matches!(err, BridgeError::Load { .. }));
        assert!(!bridge.is_ready());

        bridge.inner_html("msg", Payload::text("dropped"));
        assert_eq!(bridge.document().inner_html(node), "");

        block_on(bridge.initialize(&MockLoader::default())).unwrap();
        assert!(bridge.is_ready());
    }

    #[test]
    fn test_call_export() {
        let (mut bridge, _) = bridge_with_group("msg");
        assert!(matches!(
            bridge.call_export("parse_int_expr", &[Primitive::from("7")]),
            Err(BridgeError::NotReady)
        ));

        bridge.install(MockModule).unwrap();

        assert_eq!(
            bridge.call_export("parse_int_expr", &[Primitive::from(" 42 ")]).unwrap(),
            Primitive::Int(42)
        );
        assert!(matches!(
            bridge.call_export("parse_int_expr", &[Primitive::from("forty")]),
            Err(BridgeError::ExportCall { .. })
        ));
        assert!(matches!(
            bridge.call_export("missing", &[]),
            Err(BridgeError::MissingExport(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_export_result_feeds_an_update() {
        let (mut bridge, node) = bridge_with_group("total");
        bridge.install(MockModule).unwrap();

        let total = bridge.call_export("parse_int_expr", &[Primitive::from("12")]).unwrap();
        bridge.inner_html("total", Payload::text(total.to_string()));

        assert_eq!(bridge.document().inner_html(node), "12");
    }

    #[test]
    fn test_abi_inner_html_reads_module_memory() {
        let (mut bridge, node) = bridge_with_group("msg");
        bridge.install(MockModule).unwrap();
        let mut memory = TestMemory::default();
        let group = memory.push_str("msg");
        let text = memory.push_str("from memory");

        abi::inner_html(&mut bridge, &memory.bytes, group, text);

        assert_eq!(bridge.document().inner_html(node), "from memory");
    }

    #[test]
    fn test_abi_inner_html_list_joins() {
        let (mut bridge, node) = bridge_with_group("msg");
        bridge.install(MockModule).unwrap();
        let mut memory = TestMemory::default();
        let group = memory.push_str("msg");
        let (list_ptr, count) = memory.push_str_list(&["Hello", "World"]);

        abi::inner_html_list(&mut bridge, &memory.bytes, group, list_ptr, count);

        assert_eq!(bridge.document().inner_html(node), "Hello World");
    }

    #[test]
    fn test_abi_bad_arguments_are_dropped() {
        let (mut bridge, node) = bridge_with_group("msg");
        bridge.install(MockModule).unwrap();
        let mut memory = TestMemory::default();
        let group = memory.push_str("msg");

        abi::inner_html(&mut bridge, &memory.bytes, group, StrRef::new(1000, 4));
        abi::inner_html_list(&mut bridge, &memory.bytes, group, 0, u32::MAX);

        assert_eq!(bridge.document().inner_html(node), "");
    }

    #[test]
    fn test_abi_node_entry_points() {
        let (mut bridge, list) = bridge_with_group("list");
        bridge.install(MockModule).unwrap();
        let mut memory = TestMemory::default();
        let group = memory.push_str("list");
        let first = bridge.document_mut().create_element("li");
        let second = bridge.document_mut().create_element("li");

        abi::append_child(&mut bridge, &memory.bytes, group, first);
        assert_eq!(bridge.document().children(list), &[first]);

        abi::replace_child(&mut bridge, &memory.bytes, group, second, first);
        assert_eq!(bridge.document().children(list), &[second]);

        abi::remove_child(&mut bridge, &memory.bytes, group, second);
        assert!(bridge.document().children(list).is_empty());
    }
}
