//! Workbook - versioned service cost budgeting
//!
//! This library holds the core of the workbook: a cost formula over metered
//! services, month-0 propagation of budget values, a store of independent
//! models with version history, a transient edit session with undo/redo,
//! dataset comparison, and archive import/export with schema migration.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `models`: Core data types (services, budget rows, models, versions)
//! - `services`: Cost formula, propagation and comparison
//! - `state`: Actions, the reducer and the `Workbook` controller
//! - `session`: Speculative budget editing with undo/redo
//! - `archive`: Export, import, conflict planning and migration
//! - `storage`: Key-value persistence with debounced writes
//! - `reports`: Executive summary and monthly timeline
//! - `audit`: Audit logging of state changes
//! - `config`: Paths and settings
//! - `display`, `cli`: Terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use workbook::config::{Settings, WorkbookPaths};
//! use workbook::state::Workbook;
//!
//! let paths = WorkbookPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut workbook = Workbook::open(&paths, &settings)?;
//! ```

pub mod archive;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

pub use error::{WorkbookError, WorkbookResult};
