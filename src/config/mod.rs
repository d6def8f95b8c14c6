//! Configuration module for the workbook
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::WorkbookPaths;
pub use settings::Settings;
