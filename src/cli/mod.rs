//! CLI command handlers

pub mod commands;

pub use commands::{export, info, sheets, ExportArgs, OutputFormat};
