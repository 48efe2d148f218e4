use serde_json::Value;

use super::table::format_value;

/// Fields worth printing on their own, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "realized_amount",
    "account_value",
    "profit_loss",
    "win_rate",
    "imported",
    "deleted",
    "id",
    "initial_account_value",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object. Arrays print one
/// id (or value) per line.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    println!("{}", format_value(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_value(val));
            }
        }
        Value::Array(items) => {
            for item in items {
                match item.get("id").or_else(|| item.get("period")) {
                    Some(id) => println!("{}", format_value(id)),
                    None => println!("{}", format_value(item)),
                }
            }
        }
        other => println!("{}", format_value(other)),
    }
}
