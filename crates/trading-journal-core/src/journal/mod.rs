pub mod events;
pub mod persistence;
pub mod snapshot;
pub mod store;

pub use events::{JournalEvent, JournalObserver, LogObserver};
pub use persistence::{JsonFileStore, MemoryStore, SnapshotStore};
pub use snapshot::{Snapshot, DEFAULT_INITIAL_ACCOUNT};
pub use store::TradeJournal;
