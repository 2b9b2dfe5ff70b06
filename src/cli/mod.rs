//! CLI command handlers

pub mod commands;

pub use commands::{confirm_overwrite, month_from_number, render_dump, run, DumpFormat, RunArgs};
