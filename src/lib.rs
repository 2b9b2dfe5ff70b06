//! MRF Parse - summarize Monthly Report Form workbooks
//!
//! Each club submits a near-identical Excel workbook (an MRF). This library
//! reads a folder of them and builds one of three summaries:
//!
//! - district board feedback per club
//! - service, leadership and fellowship hours per club
//! - funds raised per charity per club
//!
//! The MRF's Annual Totals sheet holds formulas rather than numbers; the
//! [`core::reference`] module follows them to the real data ranges.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Month;
//! use mrf_parse::core::{AggregateOptions, Aggregator};
//! use mrf_parse::excel::{ExportMetadata, SummaryExporter};
//! use mrf_parse::types::Procedure;
//! use std::path::Path;
//!
//! let options = AggregateOptions::new(Procedure::Hours, Month::December, 2019);
//! let report = Aggregator::new(options)?.run(Path::new("mrfs"))?;
//!
//! println!("Clubs: {}", report.processed);
//!
//! let metadata = ExportMetadata {
//!     title: "TOTAL HOURS PER TENET".to_string(),
//!     author: "mrf-parse".to_string(),
//! };
//! SummaryExporter::new(&report.table, metadata).export(Path::new("TOTAL HOURS PER TENET.xlsx"))?;
//! # Ok::<(), mrf_parse::error::MrfError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{MrfError, MrfResult};
pub use types::{ClubRow, OutputNames, Procedure, RowValues, SummaryTable};
