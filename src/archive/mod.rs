//! Model exchange and schema migration
//!
//! - `export`: shareable model documents inside a zip container
//! - `import`: archive decoding with legacy layout detection
//! - `plan`: id-collision classification and resolutions
//! - `migrate`: forward-only upgrade of persisted state

pub mod export;
pub mod import;
pub mod migrate;
pub mod plan;

pub use export::{
    archive_file_name, encode_archive, export_json, export_model, sanitize_file_stem,
    shareable_copy, write_archive, DATA_ENTRY, LEGACY_DATA_ENTRY,
};
pub use import::{decode_model, read_archive, read_archive_file, read_data_entry};
pub use migrate::{migrate_state, migrate_value};
pub use plan::{ConflictResolution, ImportPlan, IMPORTED_SUFFIX};
