//! Document-level tests: exact output layout and the decoder's reading rules.

use serde_taxi::{
    decode, decode_with_registry, encode, encode_with_options, Error, FormatRegistry, Graph,
    Node, NodeKind, TaxiMap, TaxiOptions, Value,
};

fn miko() -> Graph {
    let mut graph = Graph::new();
    let schools = graph.insert(Node::sequence(vec![
        Value::from("Cardinal Forest"),
        Value::from("Robinson"),
        Value::from("VA Tech"),
    ]));
    let mut entries = TaxiMap::new();
    entries.insert("name".to_string(), Value::from("Miko"));
    entries.insert("schools".to_string(), Value::from(schools));
    let root = graph.insert(Node::mapping(entries).with_class("Student"));
    graph.set_root(root);
    graph
}

mod encoding {
    use super::*;

    #[test]
    fn test_pretty_layout() {
        let expected = "<taxi ver=\"1.00\">\n\
                        \t<hashref id=\"0\" class=\"Student\">\n\
                        \t\t<scalar name=\"name\" value=\"Miko\"/>\n\
                        \t\t<arrayref name=\"schools\" id=\"1\">\n\
                        \t\t\t<scalar value=\"Cardinal Forest\"/>\n\
                        \t\t\t<scalar value=\"Robinson\"/>\n\
                        \t\t\t<scalar value=\"VA Tech\"/>\n\
                        \t\t</arrayref>\n\
                        \t</hashref>\n\
                        </taxi>\n";
        assert_eq!(encode(&miko()).unwrap(), expected);
    }

    #[test]
    fn test_custom_indent_and_declaration() {
        let options = TaxiOptions::new()
            .with_indent("  ")
            .with_declaration(true);
        let graph = Graph::from_scalar(Some("x".to_string()));
        assert_eq!(
            encode_with_options(&graph, options).unwrap(),
            "<?xml version=\"1.0\"?>\n<taxi ver=\"1.00\">\n  <scalar value=\"x\"/>\n</taxi>\n"
        );
    }

    #[test]
    fn test_empty_containers_are_not_self_closed() {
        let mut graph = Graph::new();
        let root = graph.insert(Node::mapping(TaxiMap::new()));
        graph.set_root(root);
        assert_eq!(
            encode_with_options(&graph, TaxiOptions::compact()).unwrap(),
            "<taxi ver=\"1.00\"><hashref id=\"0\"></hashref></taxi>"
        );
    }

    #[test]
    fn test_names_and_classes_are_escaped() {
        let mut graph = Graph::new();
        let mut entries = TaxiMap::new();
        entries.insert("a\"b".to_string(), Value::from("<&>"));
        let root = graph.insert(Node::mapping(entries).with_class("Vec<T>"));
        graph.set_root(root);

        let taxi = encode_with_options(&graph, TaxiOptions::compact()).unwrap();
        assert!(taxi.contains("class=\"Vec&#60;T&#62;\""));
        assert!(taxi.contains("<scalar name=\"a&#34;b\" value=\"&#60;&#38;&#62;\"/>"));

        let back = decode(&taxi).unwrap();
        assert!(back.is_isomorphic(&graph));
    }

    #[test]
    fn test_box_class_round_trips() {
        let mut graph = Graph::new();
        let cell = graph.insert(Node::boxed(Value::from("42")).with_class("Counter"));
        graph.set_root(cell);

        let taxi = encode(&graph).unwrap();
        assert!(taxi.contains("<scalarref id=\"0\" class=\"Counter\">"));

        let back = decode(&taxi).unwrap();
        let node = back.resolve(back.root()).unwrap();
        assert_eq!(node.class(), Some("Counter"));
        assert_eq!(node.as_box().and_then(Value::as_str), Some("42"));
    }
}

mod decoding {
    use super::*;

    #[test]
    fn test_self_closed_wrapper_has_no_root() {
        let err = decode("<taxi ver=\"1.00\"/>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_close_tag_with_empty_stack() {
        let err = decode("<taxi ver=\"1.00\">\n</taxi>\n").unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, col: 1, .. }));

        let err = decode("<taxi ver=\"1.00\"></arrayref>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_root_close_tag_ends_decoding() {
        let graph = decode("<taxi ver=\"1.00\">\n\t<arrayref id=\"0\">\n\t\t<scalar value=\"a\"/>\n\t</arrayref>\n")
            .unwrap();
        let items = graph.resolve(graph.root()).and_then(|n| n.as_sequence()).unwrap();
        assert_eq!(items[0].as_str(), Some("a"));
    }

    #[test]
    fn test_self_closed_root_ends_decoding() {
        let graph = decode("<taxi ver=\"1.00\"><hashref id=\"0\" class=\"Empty\"/>").unwrap();
        let node = graph.resolve(graph.root()).unwrap();
        assert_eq!(node.class(), Some("Empty"));
        assert!(node.as_mapping().is_some_and(TaxiMap::is_empty));

        let graph = decode("<taxi ver=\"1.00\"><scalar/>").unwrap();
        assert!(graph.root().is_absent());
    }

    #[test]
    fn test_nothing_after_the_root_is_read() {
        let graph = decode(
            "<taxi ver=\"1.00\"><arrayref id=\"0\"></arrayref><scalar value=\"second\"/></taxi>",
        )
        .unwrap();
        assert!(graph.resolve(graph.root()).and_then(|n| n.as_sequence()).is_some());
    }

    #[test]
    fn test_trailing_content_is_not_read() {
        let graph = decode("<taxi ver=\"1.00\"><scalar value=\"x\"/></taxi>leftover <<").unwrap();
        assert_eq!(graph.root().as_str(), Some("x"));
    }

    #[test]
    fn test_unknown_attributes_are_ignored() {
        let graph = decode(
            "<taxi ver=\"1.00\" encoding=\"utf-8\"><scalar color=\"red\" value=\"x\"/></taxi>",
        )
        .unwrap();
        assert_eq!(graph.root().as_str(), Some("x"));
    }

    #[test]
    fn test_alias_ignores_declared_variant() {
        let graph = decode(
            "<taxi ver=\"1.00\"><arrayref id=\"0\"><hashref id=\"0\" redundant=\"1\"/></arrayref></taxi>",
        )
        .unwrap();
        let root = graph.root().as_node().unwrap();
        let items = graph.node(root).and_then(|n| n.as_sequence()).unwrap();
        assert_eq!(items[0].as_node(), Some(root));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_scalar_with_id_can_be_aliased() {
        let graph = decode(
            "<taxi ver=\"1.00\"><arrayref id=\"0\">\
             <scalar id=\"1\" value=\"x\"/><scalar id=\"1\" redundant=\"1\"/>\
             </arrayref></taxi>",
        )
        .unwrap();
        let items = graph.resolve(graph.root()).and_then(|n| n.as_sequence()).unwrap();
        assert_eq!(items[1].as_str(), Some("x"));
    }

    #[test]
    fn test_stub_for_unseen_id_builds_a_node() {
        let graph = decode(
            "<taxi ver=\"1.00\"><arrayref id=\"0\"><hashref id=\"7\" redundant=\"1\"/></arrayref></taxi>",
        )
        .unwrap();
        let items = graph.resolve(graph.root()).and_then(|n| n.as_sequence()).unwrap();
        let node = graph.resolve(&items[0]).unwrap();
        assert!(matches!(node.kind, NodeKind::Mapping(ref m) if m.is_empty()));
    }

    #[test]
    fn test_nested_wrapper_is_unrecognized() {
        let err = decode("<taxi ver=\"1.00\"><taxi ver=\"1.00\"/></taxi>").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedTag { ref tag, .. } if tag == "taxi"));
    }

    #[test]
    fn test_first_tag_must_be_the_wrapper() {
        let err = decode("<hashref id=\"0\"></hashref>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unknown_entities_stay_literal() {
        let graph = decode("<taxi ver=\"1.00\"><scalar value=\"&amp; &#38;\"/></taxi>").unwrap();
        assert_eq!(graph.root().as_str(), Some("&amp; &"));
    }

    #[test]
    fn test_registry_controls_versions() {
        let doc = "<taxi ver=\"0.90\"><scalar value=\"old\"/></taxi>";
        assert!(matches!(decode(doc), Err(Error::UnsupportedVersion { .. })));

        let registry = FormatRegistry::new().with_version("0.90");
        let graph = decode_with_registry(doc, &registry).unwrap();
        assert_eq!(graph.root().as_str(), Some("old"));

        let nothing = FormatRegistry::empty();
        let current = encode(&miko()).unwrap();
        assert!(decode_with_registry(&current, &nothing).is_err());
    }

    #[test]
    fn test_error_reports_location() {
        let err = decode("<taxi ver=\"1.00\">\n\t<hashref id=\"0\">\n\t\t<scalar value=\"x\"/>\n")
            .unwrap_err();
        match err {
            Error::Malformed { line, col, msg } => {
                assert_eq!((line, col), (3, 3));
                assert!(msg.contains("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
