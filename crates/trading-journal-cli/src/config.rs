use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use trading_journal_core::journal::{JsonFileStore, LogObserver, TradeJournal};

/// Settings resolved from flags, environment and platform defaults.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub data_file: PathBuf,
    pub log_level: String,
}

impl JournalConfig {
    pub fn resolve(
        data_file: Option<PathBuf>,
        log_level: String,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let data_file = match data_file {
            Some(path) => path,
            None => default_data_file().ok_or(
                "Could not determine a data directory; pass --data or set TJ_DATA_FILE",
            )?,
        };
        Ok(Self {
            data_file,
            log_level,
        })
    }

    /// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
    /// Logs go to stderr so command output on stdout stays parseable.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn open_journal(&self) -> Result<TradeJournal, Box<dyn std::error::Error>> {
        let mut journal = TradeJournal::open(JsonFileStore::new(&self.data_file))
            .map_err(|e| format!("Failed to open '{}': {}", self.data_file.display(), e))?;
        journal.subscribe(Box::new(LogObserver));
        Ok(journal)
    }
}

/// `<data dir>/trading-journal/journal.json`
pub fn default_data_file() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("trading-journal").join("journal.json"))
}
