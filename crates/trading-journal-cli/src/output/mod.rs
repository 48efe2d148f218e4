pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Embedded screenshots are data URLs of arbitrary size; show only the header.
pub(crate) fn abbreviate_image(s: &str) -> String {
    const KEEP: usize = 48;
    if !s.starts_with("data:") || s.len() <= KEEP {
        return s.to_string();
    }
    let head = s.split_once(',').map(|(h, _)| h).unwrap_or("data:");
    format!("{},… ({} chars)", head, s.len())
}
