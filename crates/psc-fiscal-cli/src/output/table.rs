use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, rows};

/// Format output as tables: annual rows as a grid, everything else as
/// field / value pairs.
pub fn print_table(value: &Value) {
    if let Some(rows) = rows(value) {
        print_rows(rows);
    } else if let Some(Value::Object(result)) = value.get("result") {
        print_fields(result);
    } else if let Value::Object(map) = value {
        print_fields(map);
    } else {
        println!("{}", value);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        // Per-year arrays and nested series are summarised, not dumped.
        let rendered = match val {
            Value::Array(items) if items.len() > 8 => format!("[{} values]", items.len()),
            _ => cell(val),
        };
        builder.push_record([key.as_str(), &rendered]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };

    // Skip columns that are zero in every row.
    let headers: Vec<&String> = first
        .keys()
        .filter(|h| {
            rows.iter().any(|row| {
                row.get(h.as_str())
                    .map(|v| !is_zero(v))
                    .unwrap_or(false)
            })
        })
        .collect();

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::String(s) => s.parse::<f64>().map(|v| v == 0.0).unwrap_or(false),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}
