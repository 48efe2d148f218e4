pub mod file;
pub mod image;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed JSON from `--input <file>` if given, else from piped stdin.
/// `None` when neither supplied anything.
pub fn file_or_stdin<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
