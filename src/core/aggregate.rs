//! Directory-level aggregation: every MRF in a folder → one summary table

use crate::core::extract::{Extractor, MonthWindow};
use crate::error::MrfResult;
use crate::excel::Workbook;
use crate::types::{ClubRow, OutputNames, Procedure, SummaryTable};
use chrono::Month;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Spreadsheet extensions accepted as MRF input
pub const INPUT_EXTENSIONS: [&str; 3] = ["xls", "xlsx", "xlsm"];

/// What to do when one input file is structurally broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole run on the first broken file
    #[default]
    Abort,
    /// Log a warning, record the file as skipped, keep going
    Skip,
}

/// Everything the aggregator needs to know about a run
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    pub procedure: Procedure,
    pub month: Month,
    /// Only shown in titles and headers
    pub year: i32,
    pub window: MonthWindow,
    pub year_to_date: bool,
    pub failure_policy: FailurePolicy,
    /// File names never treated as input (prior outputs)
    pub excluded: Vec<String>,
}

impl AggregateOptions {
    pub fn new(procedure: Procedure, month: Month, year: i32) -> Self {
        Self {
            procedure,
            month,
            year,
            window: MonthWindow::default(),
            year_to_date: false,
            failure_policy: FailurePolicy::default(),
            excluded: OutputNames::default().file_names(),
        }
    }

    pub fn with_window(mut self, window: MonthWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_year_to_date(mut self, year_to_date: bool) -> Self {
        self.year_to_date = year_to_date;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_excluded(mut self, excluded: Vec<String>) -> Self {
        self.excluded = excluded;
        self
    }
}

/// A candidate file that produced no row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a run
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub table: SummaryTable,
    pub processed: usize,
    pub skipped: Vec<SkippedFile>,
}

/// List MRF candidates in `dir`, sorted by file name.
///
/// Directories, non-spreadsheet extensions, Office lock files (`~$…`) and any
/// name in `excluded` are left out.
pub fn discover_inputs(dir: &Path, excluded: &[String]) -> MrfResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        if path.is_dir() || !has_input_extension(&path) || name.starts_with("~$") {
            continue;
        }
        if excluded.iter().any(|ex| ex.eq_ignore_ascii_case(&name)) {
            debug!(file = %name, "skipping prior output");
            continue;
        }

        inputs.push(path);
    }

    inputs.sort();
    Ok(inputs)
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| INPUT_EXTENSIONS.iter().any(|ok| ok.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Runs one procedure over a directory of MRFs
pub struct Aggregator {
    options: AggregateOptions,
    extractor: Extractor,
}

impl Aggregator {
    pub fn new(options: AggregateOptions) -> MrfResult<Self> {
        let extractor = Extractor::new(options.month, options.window, options.year_to_date)?;
        Ok(Self { options, extractor })
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Open one file and extract its row. The workbook is dropped on return.
    pub fn process_file(&self, path: &Path) -> MrfResult<Option<ClubRow>> {
        let workbook = Workbook::open(path)?;
        self.extractor.extract(self.options.procedure, &workbook)
    }

    pub fn run(&self, dir: &Path) -> MrfResult<AggregateReport> {
        let opts = &self.options;
        let mut table = SummaryTable::new(opts.procedure, opts.month, opts.year);
        let mut processed = 0;
        let mut skipped = Vec::new();

        for path in discover_inputs(dir, &opts.excluded)? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Reading {}...", name);

            match self.process_file(&path) {
                Ok(Some(row)) => {
                    table.push_row(row);
                    processed += 1;
                }
                Ok(None) => {
                    debug!(file = %name, "no '{}' sheet, skipped", opts.month.name());
                    skipped.push(SkippedFile {
                        path,
                        reason: format!("no sheet named {}", opts.month.name()),
                    });
                }
                Err(e) if opts.failure_policy == FailurePolicy::Skip && e.is_structural() => {
                    warn!(file = %name, "skipped: {}", e);
                    skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(file = %name, "extraction failed: {}", e);
                    return Err(e);
                }
            }
        }

        info!("Post-processing...");
        if processed == 0 {
            warn!("No Excel file processed!");
        }
        table.append_total_row();

        Ok(AggregateReport {
            table,
            processed,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in [
            "b club.xlsx",
            "a club.XLSM",
            "c club.xls",
            "notes.txt",
            "archive.xlsx.bak",
            "~$b club.xlsx",
            "TOTAL HOURS PER TENET.xlsx",
            "total funds raised per dfi.xlsx",
        ] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        let found: Vec<String> = discover_inputs(dir.path(), &OutputNames::default().file_names())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(found, vec!["a club.XLSM", "b club.xlsx", "c club.xls"]);
    }

    #[test]
    fn test_discover_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_inputs(&dir.path().join("absent"), &[]).unwrap_err();
        assert!(matches!(err, crate::error::MrfError::Io(_)));
    }

    #[test]
    fn test_empty_directory_yields_header_only_table() {
        let dir = TempDir::new().unwrap();
        let aggregator =
            Aggregator::new(AggregateOptions::new(Procedure::Hours, Month::May, 2020)).unwrap();
        let report = aggregator.run(dir.path()).unwrap();

        assert_eq!(report.processed, 0);
        assert!(report.table.rows.is_empty());
        assert!(report.table.total.is_none());
        assert_eq!(report.table.header_row_count(), 2);
    }

    #[test]
    fn test_unreadable_file_aborts_by_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.xlsx"), b"not a zip").unwrap();

        let aggregator =
            Aggregator::new(AggregateOptions::new(Procedure::Funds, Month::May, 2020)).unwrap();
        assert!(aggregator.run(dir.path()).is_err());
    }

    #[test]
    fn test_unreadable_file_skipped_under_skip_policy() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.xlsx"), b"not a zip").unwrap();

        let options = AggregateOptions::new(Procedure::Funds, Month::May, 2020)
            .with_failure_policy(FailurePolicy::Skip);
        let report = Aggregator::new(options).unwrap().run(dir.path()).unwrap();

        assert_eq!(report.processed, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("broken.xlsx"));
    }
}
