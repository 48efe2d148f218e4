use clap::Args;
use serde_json::{json, Value};

use trading_journal_core::journal::Snapshot;

use crate::config::JournalConfig;
use crate::input;

/// Arguments for replacing the journal with an exported snapshot
#[derive(Args)]
pub struct ImportArgs {
    /// Snapshot file (or stdin); the browser build's `{"state": ...}` export
    /// is accepted
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_import(args: ImportArgs, config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let (text, source) = match args.input.as_deref() {
        Some(path) => (input::file::read_text(path)?, path.to_string()),
        None => (
            input::stdin::read_stdin_text()?
                .ok_or("--input <snapshot.json> or stdin required for import")?,
            "stdin".to_string(),
        ),
    };
    let snapshot = Snapshot::from_legacy_json(&text)
        .map_err(|e| format!("Failed to parse '{}': {}", source, e))?;
    let imported = snapshot.trades.len();

    let mut journal = config.open_journal()?;
    journal.replace(snapshot)?;
    journal.flush()?;

    Ok(json!({
        "imported": imported,
        "initial_account_value": journal.initial_account(),
    }))
}

/// The whole snapshot, in the same shape `import` reads.
pub fn run_export(config: &JournalConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let journal = config.open_journal()?;
    Ok(serde_json::to_value(journal.snapshot())?)
}
