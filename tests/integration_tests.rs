use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_taxi::{
    decode, encode, encode_with_options, from_graph, from_str, to_graph, to_string, Error, Graph,
    Node, NodeKind, TaxiMap, TaxiOptions, Value,
};
use std::collections::BTreeMap;

fn mapping_of(graph: &Graph, value: &Value) -> TaxiMap {
    graph
        .resolve(value)
        .and_then(|n| n.as_mapping())
        .cloned()
        .expect("mapping node")
}

#[test]
fn test_miko_round_trip() {
    let mut graph = Graph::new();
    let schools = graph.insert(Node::sequence(vec![
        Value::from("Cardinal Forest"),
        Value::from("Robinson"),
        Value::from("VA Tech"),
    ]));
    let mut entries = TaxiMap::new();
    entries.insert("name".to_string(), Value::from("Miko"));
    entries.insert("schools".to_string(), Value::from(schools));
    let root = graph.insert(Node::mapping(entries));
    graph.set_root(root);

    let taxi = encode(&graph).unwrap();
    println!("Miko Taxi:\n{}", taxi);

    let back = decode(&taxi).unwrap();
    let map = mapping_of(&back, back.root());
    assert_eq!(map.get("name").and_then(Value::as_str), Some("Miko"));

    let schools = back
        .resolve(map.get("schools").unwrap())
        .and_then(|n| n.as_sequence())
        .unwrap();
    let names: Vec<_> = schools.iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(names, ["Cardinal Forest", "Robinson", "VA Tech"]);
    assert_eq!(schools[1].as_str(), Some("Robinson"));
}

#[test]
fn test_miko_through_serde() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Student {
        name: String,
        schools: Vec<String>,
    }

    let miko = Student {
        name: "Miko".to_string(),
        schools: vec![
            "Cardinal Forest".to_string(),
            "Robinson".to_string(),
            "VA Tech".to_string(),
        ],
    };

    let taxi = to_string(&miko).unwrap();
    let back: Student = from_str(&taxi).unwrap();
    assert_eq!(back.schools[1], "Robinson");
    assert_eq!(back, miko);
}

#[test]
fn test_shared_child_decodes_to_one_node() {
    let mut graph = Graph::new();
    let mut format = TaxiMap::new();
    format.insert("type".to_string(), Value::from("taxi"));
    let shared = graph.insert(Node::mapping(format).with_class("DataFormat"));

    let mut entries = TaxiMap::new();
    entries.insert("dataformat".to_string(), Value::from(shared));
    entries.insert("otherdataformat".to_string(), Value::from(shared));
    let root = graph.insert(Node::mapping(entries));
    graph.set_root(root);

    let taxi = encode(&graph).unwrap();
    assert_eq!(taxi.matches("<scalar name=\"type\"").count(), 1);

    let back = decode(&taxi).unwrap();
    let map = mapping_of(&back, back.root());
    let first = map.get("dataformat").and_then(Value::as_node).unwrap();
    let second = map.get("otherdataformat").and_then(Value::as_node).unwrap();
    assert_eq!(first, second);
    assert_eq!(back.node(first).unwrap().class(), Some("DataFormat"));
    assert!(back.is_isomorphic(&graph));
}

#[test]
fn test_mutation_through_alias_is_visible() {
    let taxi = "<taxi ver=\"1.00\">\n\
                \t<hashref id=\"0\">\n\
                \t\t<hashref name=\"a\" id=\"1\">\n\
                \t\t\t<scalar name=\"n\" value=\"1\"/>\n\
                \t\t</hashref>\n\
                \t\t<hashref name=\"b\" id=\"1\" redundant=\"1\"/>\n\
                \t</hashref>\n\
                </taxi>\n";

    let mut graph = decode(taxi).unwrap();
    let map = mapping_of(&graph, graph.root());
    let a = map.get("a").and_then(Value::as_node).unwrap();
    let b = map.get("b").and_then(Value::as_node).unwrap();

    graph
        .insert_entry(a, "n".to_string(), Value::from("2"))
        .unwrap();

    let through_b = graph.node(b).and_then(|n| n.as_mapping()).unwrap();
    assert_eq!(through_b.get("n").and_then(Value::as_str), Some("2"));
}

#[test]
fn test_self_referencing_box() {
    let mut graph = Graph::new();
    let cell = graph.insert(Node::boxed(Value::absent()));
    graph.set_box_content(cell, Value::from(cell)).unwrap();
    graph.set_root(cell);

    let taxi = encode(&graph).unwrap();
    let back = decode(&taxi).unwrap();

    let root = back.root().as_node().unwrap();
    let content = back.node(root).and_then(|n| n.as_box()).unwrap();
    assert_eq!(content.as_node(), Some(root));
    assert!(back.is_isomorphic(&graph));
}

#[test]
fn test_cycle_through_mappings() {
    let mut graph = Graph::new();
    let parent = graph.insert(Node::mapping(TaxiMap::new()).with_class("Parent"));
    let child = graph.insert(Node::mapping(TaxiMap::new()).with_class("Child"));
    graph
        .insert_entry(parent, "child".to_string(), Value::from(child))
        .unwrap();
    graph
        .insert_entry(child, "parent".to_string(), Value::from(parent))
        .unwrap();
    graph.set_root(parent);

    let taxi = encode(&graph).unwrap();
    assert_eq!(taxi.matches("redundant=\"1\"").count(), 1);

    let back = decode(&taxi).unwrap();
    let root = back.root().as_node().unwrap();
    let child = mapping_of(&back, back.root())
        .get("child")
        .and_then(Value::as_node)
        .unwrap();
    let parent = back
        .node(child)
        .and_then(|n| n.as_mapping())
        .and_then(|m| m.get("parent"))
        .and_then(Value::as_node);
    assert_eq!(parent, Some(root));
    assert!(back.is_isomorphic(&graph));
}

#[test]
fn test_cycle_cannot_become_a_tree() {
    let mut graph = Graph::new();
    let list = graph.insert(Node::sequence(vec![]));
    graph.push(list, Value::from(list)).unwrap();
    graph.set_root(list);

    let result: Result<serde_json::Value, _> = from_graph(&graph);
    assert!(matches!(result, Err(Error::Cycle(id)) if id == list));
}

#[test]
fn test_reencode_is_stable() {
    let mut graph = Graph::new();
    let leaf = graph.insert(Node::sequence(vec![Value::from("x"), Value::absent()]));
    let wrapper = graph.insert(Node::boxed(Value::from(leaf)).with_class("Ref"));
    let root = graph.insert(Node::sequence(vec![
        Value::from(leaf),
        Value::from(wrapper),
        Value::from(wrapper),
    ]));
    graph.set_root(root);

    let first = encode(&graph).unwrap();
    let second = encode(&decode(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_absent_and_empty_scalars_stay_distinct() {
    let graph = decode(
        "<taxi ver=\"1.00\"><arrayref id=\"0\"><scalar/><scalar value=\"\"/></arrayref></taxi>",
    )
    .unwrap();
    let items = graph.resolve(graph.root()).and_then(|n| n.as_sequence()).unwrap();
    assert!(items[0].is_absent());
    assert_eq!(items[1].as_str(), Some(""));
}

#[test]
fn test_version_gate() {
    let missing = decode("<taxi><scalar value=\"x\"/></taxi>").unwrap_err();
    assert!(matches!(missing, Error::UnsupportedVersion { found: None }));

    let unknown = decode("<taxi ver=\"2.00\"><scalar value=\"x\"/></taxi>").unwrap_err();
    assert!(
        matches!(unknown, Error::UnsupportedVersion { found: Some(ref v) } if v == "2.00")
    );
    assert!(unknown.to_string().contains("2.00"));
}

#[test]
fn test_unrecognized_tag() {
    let err = decode("<taxi ver=\"1.00\">\n\t<listref id=\"0\"/>\n</taxi>").unwrap_err();
    match err {
        Error::UnrecognizedTag { line, col, tag } => {
            assert_eq!(tag, "listref");
            assert_eq!((line, col), (2, 2));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_malformed_documents() {
    let cases = [
        "<taxi ver=\"1.00\"></taxi>",
        "<taxi ver=\"1.00\"><hashref id=\"0\"><scalar value=\"a\"/></hashref></taxi>",
        "<taxi ver=\"1.00\"><arrayref id=\"0\"></hashref></taxi>",
        "<taxi ver=\"1.00\"><arrayref id=\"x\"></arrayref></taxi>",
        "<taxi ver=\"1.00\">hello<scalar/></taxi>",
        "<taxi ver=\"1.00\"><scalarref id=\"0\"><scalar/><scalar/></scalarref></taxi>",
        "<taxi ver=\"1.00\"><scalar value=\"a\"></scalar></taxi>",
        "</taxi>",
    ];

    for case in cases {
        let err = decode(case).unwrap_err();
        assert!(err.is_malformed(), "{case} gave {err:?}");
    }
}

#[test]
fn test_deep_nesting_round_trip() {
    const DEPTH: usize = 100_000;

    let mut taxi = String::from("<taxi ver=\"1.00\">");
    for i in 0..DEPTH {
        taxi.push_str(&format!("<arrayref id=\"{}\">", i));
    }
    taxi.push_str("<scalar value=\"bottom\"/>");
    for _ in 0..DEPTH {
        taxi.push_str("</arrayref>");
    }
    taxi.push_str("</taxi>");

    let graph = decode(&taxi).unwrap();
    assert_eq!(graph.len(), DEPTH);
    assert_eq!(encode_with_options(&graph, TaxiOptions::compact()).unwrap(), taxi);
}

#[test]
fn test_decoding_stops_when_root_closes() {
    let graph = decode(
        "<taxi ver=\"1.00\">\n\t<hashref id=\"0\">\n\t</hashref>\n<not a tag at all",
    )
    .unwrap();
    assert!(mapping_of(&graph, graph.root()).is_empty());

    let graph = decode("<taxi ver=\"1.00\"><scalar value=\"only\"/><scalar value=\"ignored\"/>")
        .unwrap();
    assert_eq!(graph.root().as_str(), Some("only"));
}

#[test]
fn test_close_tag_without_open_container() {
    for case in ["<taxi ver=\"1.00\"></taxi>", "<taxi ver=\"1.00\"></hashref>"] {
        let err = decode(case).unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 1, col: 18, .. }), "{case} gave {err:?}");
    }
}

#[test]
fn test_shared_chain_is_bounded_through_serde() {
    let mut graph = Graph::new();
    let mut below = graph.insert(Node::sequence(vec![Value::from("leaf")]));
    for _ in 0..40 {
        below = graph.insert(Node::sequence(vec![Value::from(below), Value::from(below)]));
    }
    graph.set_root(below);

    // the document stays small, one full node per level
    let taxi = encode(&graph).unwrap();
    assert_eq!(taxi.matches("redundant=\"1\"").count(), 40);

    let result: Result<serde_json::Value, _> = from_str(&taxi);
    assert!(matches!(result, Err(Error::VisitLimit { .. })));
}

#[test]
fn test_truncated_document() {
    let err = decode("<taxi ver=\"1.00\">\n\t<arrayref id=\"0\">\n").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { ref expected, .. } if expected == "</arrayref>"));

    let err = decode("").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { .. }));
}

#[test]
fn test_serde_nested_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Circle { radius: f64 },
        Square(u32),
        Empty,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Drawing {
        title: String,
        shapes: Vec<Shape>,
        layers: BTreeMap<u8, Option<String>>,
        origin: (i64, i64),
    }

    let mut layers = BTreeMap::new();
    layers.insert(0, Some("background".to_string()));
    layers.insert(1, None);

    let drawing = Drawing {
        title: "a < b & \"c\"".to_string(),
        shapes: vec![
            Shape::Circle { radius: 1.5 },
            Shape::Square(4),
            Shape::Empty,
        ],
        layers,
        origin: (-3, 7),
    };

    let taxi = to_string(&drawing).unwrap();
    assert!(taxi.contains("class=\"Drawing\""));
    let back: Drawing = from_str(&taxi).unwrap();
    assert_eq!(back, drawing);
}

#[test]
fn test_serde_json_value_round_trip() {
    let value = json!({
        "name": "Miko",
        "schools": ["Cardinal Forest", "Robinson", null],
        "address": { "city": "Vienna", "zip": "22180" },
        "empty": [],
    });

    let taxi = to_string(&value).unwrap();
    let back: serde_json::Value = from_str(&taxi).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_shared_nodes_deserialize_as_copies() {
    let mut graph = Graph::new();
    let shared = graph.insert(Node::sequence(vec![Value::from("1"), Value::from("2")]));
    let root = graph.insert(Node::sequence(vec![Value::from(shared), Value::from(shared)]));
    graph.set_root(root);

    let taxi = encode(&graph).unwrap();
    let lists: Vec<Vec<u32>> = from_str(&taxi).unwrap();
    assert_eq!(lists, vec![vec![1, 2], vec![1, 2]]);
}

#[test]
fn test_to_graph_shape() {
    #[derive(Serialize)]
    struct Pair(u8, u8);

    let graph = to_graph(&Pair(1, 2)).unwrap();
    let node = graph.resolve(graph.root()).unwrap();
    assert_eq!(node.class(), Some("Pair"));
    assert!(matches!(node.kind, NodeKind::Sequence(ref items) if items.len() == 2));
}
