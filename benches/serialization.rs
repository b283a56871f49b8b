use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_taxi::{decode, encode, from_str, to_string, Graph, Node, TaxiMap, Value};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product <{}>", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

/// A list of `size` records that all point at one shared format node, closed
/// into a cycle through `owner`.
fn shared_graph(size: usize) -> Graph {
    let mut graph = Graph::new();
    let mut format = TaxiMap::new();
    format.insert("type".to_string(), Value::from("taxi"));
    let format = graph.insert(Node::mapping(format).with_class("DataFormat"));
    let list = graph.insert(Node::sequence(Vec::new()));

    for i in 0..size {
        let mut record = TaxiMap::new();
        record.insert("index".to_string(), Value::from(i.to_string()));
        record.insert("format".to_string(), Value::from(format));
        record.insert("owner".to_string(), Value::from(list));
        let record = graph.insert(Node::mapping(record).with_class("Record"));
        graph.push(list, Value::from(record)).unwrap();
    }

    graph.set_root(list);
    graph
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let taxi = "<taxi ver=\"1.00\">\n\
                \t<hashref id=\"0\" class=\"User\">\n\
                \t\t<scalar name=\"id\" value=\"123\"/>\n\
                \t\t<scalar name=\"name\" value=\"Alice\"/>\n\
                \t\t<scalar name=\"email\" value=\"alice@example.com\"/>\n\
                \t\t<scalar name=\"active\" value=\"true\"/>\n\
                \t</hashref>\n\
                </taxi>\n";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(taxi)))
    });
}

fn benchmark_serialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_array");

    for size in [10, 50, 100, 500].iter() {
        let products = products(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&products)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_array");

    for size in [10, 50, 100, 500].iter() {
        let taxi = to_string(&products(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &taxi, |b, taxi| {
            b.iter(|| from_str::<Vec<Product>>(black_box(taxi)))
        });
    }
    group.finish();
}

fn benchmark_shared_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_graph");

    for size in [10, 100, 1000].iter() {
        let graph = shared_graph(*size);
        let taxi = encode(&graph).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), &graph, |b, graph| {
            b.iter(|| encode(black_box(graph)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &taxi, |b, taxi| {
            b.iter(|| decode(black_box(taxi)))
        });
    }
    group.finish();
}

fn benchmark_escaping(c: &mut Criterion) {
    let mut group = c.benchmark_group("escaping");

    let plain = "This is a medium length string with some content".to_string();
    let markup = "<a href=\"x\">&#38; &amp; \"quoted\"</a>".repeat(8);

    group.bench_function("plain_string", |b| b.iter(|| to_string(black_box(&plain))));
    group.bench_function("markup_string", |b| b.iter(|| to_string(black_box(&markup))));

    let markup_taxi = to_string(&markup).unwrap();
    group.bench_function("markup_string_decode", |b| {
        b.iter(|| from_str::<String>(black_box(&markup_taxi)))
    });

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };

    let mut group = c.benchmark_group("comparison");

    group.bench_function("taxi_serialize", |b| {
        b.iter(|| serde_taxi::to_string(black_box(&user)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&user)))
    });

    let taxi_str = serde_taxi::to_string(&user).unwrap();
    let json_str = serde_json::to_string(&user).unwrap();

    group.bench_function("taxi_deserialize", |b| {
        b.iter(|| serde_taxi::from_str::<User>(black_box(&taxi_str)))
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<User>(black_box(&json_str)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_array,
    benchmark_deserialize_array,
    benchmark_shared_graph,
    benchmark_escaping,
    benchmark_comparison_with_json
);
criterion_main!(benches);
