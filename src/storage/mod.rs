//! Storage layer for the workbook
//!
//! A key-value abstraction over durable string blobs, a JSON file backend with
//! atomic writes, and the debounced scheduler that persists application state.

pub mod file_io;
pub mod kv;
pub mod scheduler;

pub use file_io::{read_optional, write_atomic, write_json_atomic};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use scheduler::{PersistScheduler, DEFAULT_DEBOUNCE_MS, STATE_KEY};
