use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use super::file;

/// Read a chart screenshot and embed it as a `data:` URL, the form trades
/// store their image in.
pub fn read_data_url(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = file::read_bytes(path)?;
    Ok(to_data_url(mime_for(path), &bytes))
}

fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

fn mime_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
