use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::abbreviate_image;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_envelope(result, map);
            } else if map.values().all(|v| v.is_object()) && !map.is_empty() {
                // Keyed buckets, e.g. `group --by month`
                print_keyed_table(map);
            } else {
                print_field_table(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", format_value(value)),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_field_table(res_map),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_keyed_table(map: &Map<String, Value>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    let Some(Value::Object(first)) = keys.first().and_then(|k| map.get(*k)) else {
        return;
    };
    let columns: Vec<String> = first.keys().cloned().collect();

    let mut builder = Builder::default();
    let mut header = vec!["period".to_string()];
    header.extend(columns.iter().cloned());
    builder.push_record(header);

    for key in keys {
        let mut row = vec![key.clone()];
        if let Some(Value::Object(bucket)) = map.get(key) {
            row.extend(
                columns
                    .iter()
                    .map(|c| bucket.get(c).map(format_value).unwrap_or_default()),
            );
        }
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(no trades)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

/// Render one cell. Exit legs get a compact trader notation.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => abbreviate_image(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => format_leg(map).unwrap_or_else(|| value.to_string()),
    }
}

/// `{rr, percentage, hit}` → "2R @ 50% hit"; `{percentage, hit}` → "1% risk".
fn format_leg(map: &Map<String, Value>) -> Option<String> {
    let pct = map.get("percentage").map(format_value)?;
    let hit = map.get("hit").and_then(Value::as_bool)?;
    let mark = if hit { " hit" } else { "" };
    match map.get("rr") {
        Some(rr) => Some(format!("{}R @ {}%{}", format_value(rr), pct, mark)),
        None => Some(format!("{}% risk{}", pct, mark)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leg_notation() {
        assert_eq!(
            format_value(&json!({"rr": "2", "percentage": "50", "hit": true})),
            "2R @ 50% hit"
        );
        assert_eq!(
            format_value(&json!({"percentage": "1", "hit": false})),
            "1% risk"
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!(false)), "no");
        assert_eq!(format_value(&json!(["a", "b"])), "a, b");
    }
}
