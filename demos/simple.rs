//! Round-tripping plain Rust types through Taxi.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_taxi::{from_str, to_string, to_string_with_options, TaxiOptions};
use std::error::Error;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Student {
    name: String,
    schools: Vec<String>,
    graduated: Option<u16>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let miko = Student {
        name: "Miko".to_string(),
        schools: vec![
            "Cardinal Forest".to_string(),
            "Robinson".to_string(),
            "VA Tech".to_string(),
        ],
        graduated: None,
    };

    let taxi = to_string(&miko)?;
    println!("Pretty:\n{}", taxi);

    let compact = to_string_with_options(&miko, TaxiOptions::compact())?;
    println!("Compact:\n{}\n", compact);

    let back: Student = from_str(&taxi)?;
    println!("Decoded: {:?}", back);
    assert_eq!(back, miko);

    Ok(())
}
