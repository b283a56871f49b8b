//! Building a graph with shared and cyclic nodes by hand.
//!
//! Run with: cargo run --example shared_nodes

use serde_taxi::{decode, encode, Graph, Node, TaxiMap, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let mut graph = Graph::new();

    let mut format = TaxiMap::new();
    format.insert("type".to_string(), Value::from("taxi"));
    let format = graph.insert(Node::mapping(format).with_class("DataFormat"));

    let doc = graph.insert(Node::mapping(TaxiMap::new()).with_class("Document"));
    graph.insert_entry(doc, "dataformat".to_string(), Value::from(format))?;
    graph.insert_entry(doc, "otherdataformat".to_string(), Value::from(format))?;

    // A box that holds itself.
    let cell = graph.insert(Node::boxed(Value::absent()));
    graph.set_box_content(cell, Value::from(cell))?;
    graph.insert_entry(doc, "self".to_string(), Value::from(cell))?;

    graph.set_root(doc);

    let taxi = encode(&graph)?;
    println!("{}", taxi);

    let back = decode(&taxi)?;
    let map = back
        .resolve(back.root())
        .and_then(|node| node.as_mapping())
        .ok_or("root is not a mapping")?;

    let first = map.get("dataformat").and_then(Value::as_node);
    let second = map.get("otherdataformat").and_then(Value::as_node);
    println!("dataformat and otherdataformat share a node: {}", first == second);
    println!("isomorphic to the original: {}", back.is_isomorphic(&graph));

    Ok(())
}
