use serde_json::Value;
use std::io::{self, Read};

/// Whole piped stdin as text. `None` when stdin is a terminal or the pipe
/// carried nothing but whitespace.
pub fn read_stdin_text() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(buffer))
}

/// Piped stdin parsed as JSON.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let Some(text) = read_stdin_text()? else {
        return Ok(None);
    };
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| format!("Failed to parse stdin as JSON: {}", e))?;
    Ok(Some(value))
}
