use serde_json::Value;

use super::cell;

/// Headline figure of each command, in priority order.
const HEADLINE_KEYS: [&str; 5] = ["ctr_npv", "npv", "base_npv", "total_depreciation", "irr"];

/// Print just the headline value of the output.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    if let Value::Object(map) = result {
        for key in HEADLINE_KEYS {
            match map.get(key) {
                // Monte Carlo statistics: report the mean
                Some(Value::Object(stats)) => {
                    if let Some(mean) = stats.get("mean") {
                        println!("{}", cell(mean));
                        return;
                    }
                }
                Some(val) if !val.is_null() => {
                    println!("{}", cell(val));
                    return;
                }
                _ => {}
            }
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val));
            return;
        }
    }

    println!("{}", cell(result));
}
