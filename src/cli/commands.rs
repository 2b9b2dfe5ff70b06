use crate::core::{AggregateOptions, AggregateReport, Aggregator, FailurePolicy, MonthWindow};
use crate::error::{MrfError, MrfResult};
use crate::excel::{ExportMetadata, SummaryExporter};
use crate::types::{OutputNames, Procedure, SummaryTable};
use chrono::Month;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Format for `--dump`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DumpFormat {
    Json,
    Yaml,
}

/// Everything the `run` command needs, as parsed from the command line
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub month: u8,
    pub year: i32,
    pub procedure: Procedure,
    pub indir: PathBuf,
    pub outdir: PathBuf,
    pub fiscal_start: u8,
    pub year_to_date: bool,
    pub skip_invalid: bool,
    pub yes: bool,
    pub author: String,
    pub dump: Option<DumpFormat>,
}

/// Map 1-12 to a calendar month
pub fn month_from_number(n: u8) -> MrfResult<Month> {
    Month::try_from(n).map_err(|_| MrfError::Config(format!("Month must be 1-12, got {}", n)))
}

/// Execute a summary run: aggregate, write, report
pub fn run(args: RunArgs) -> MrfResult<()> {
    let month = month_from_number(args.month)?;
    let fiscal_start = month_from_number(args.fiscal_start)?;

    println!("{}", "📊 MRF Parse - Summarizing reports".bold().green());
    println!("   Procedure: {:?}", args.procedure);
    println!("   Month:     {} {}", month.name(), args.year);
    println!("   Input:     {}", args.indir.display());
    println!();

    if !args.indir.is_dir() {
        return Err(MrfError::Config(format!(
            "The input directory {} is not a folder!",
            args.indir.display()
        )));
    }

    let names = OutputNames::default();
    let out_path = args.outdir.join(names.file_name(args.procedure));
    {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        confirm_overwrite(&out_path, args.yes, &mut stdin.lock(), &mut stdout)?;
    }

    let begin = Instant::now();

    let policy = if args.skip_invalid {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    let options = AggregateOptions::new(args.procedure, month, args.year)
        .with_window(MonthWindow::new(fiscal_start))
        .with_year_to_date(args.year_to_date)
        .with_failure_policy(policy)
        .with_excluded(names.file_names());

    let report = Aggregator::new(options)?.run(&args.indir)?;
    print_report(&report);

    let metadata = ExportMetadata {
        title: names.stem(args.procedure).to_string(),
        author: args.author.clone(),
    };
    SummaryExporter::new(&report.table, metadata).export(&out_path)?;

    if let Some(format) = args.dump {
        println!("{}", render_dump(&report.table, format)?);
    }

    println!("{}", "✅ Done".bold().green());
    println!("   Summary saved to {}", out_path.display());
    println!(
        "   Data extraction took {:.3} seconds",
        begin.elapsed().as_secs_f64()
    );

    Ok(())
}

fn print_report(report: &AggregateReport) {
    println!(
        "   Processed {} file(s), skipped {}",
        report.processed.to_string().bold(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!(
            "   {} {}: {}",
            "⚠️".yellow(),
            skipped.path.display(),
            skipped.reason
        );
    }
    if report.processed == 0 {
        println!("{}", "⚠️  No Excel file processed!".yellow());
    }
    println!();
}

/// Decide whether `path` may be written.
///
/// A missing path is fine. An existing non-file is refused. An existing file
/// needs `assume_yes` or a `y` answer on `input`.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    path: &Path,
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
) -> MrfResult<()> {
    if !path.exists() {
        return Ok(());
    }
    if !path.is_file() {
        return Err(MrfError::Config(format!(
            "{} already exists and cannot be overwritten!",
            path.display()
        )));
    }
    if assume_yes {
        return Ok(());
    }

    write!(
        output,
        "The output file already exists in the directory specified. Overwrite? [y/N] "
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if answer.trim().eq_ignore_ascii_case("y") {
        writeln!(output, "Overwriting...")?;
        Ok(())
    } else {
        Err(MrfError::Cancelled("Overwrite cancelled!".to_string()))
    }
}

/// Serialize the extracted table for `--dump`
pub fn render_dump(table: &SummaryTable, format: DumpFormat) -> MrfResult<String> {
    match format {
        DumpFormat::Json => {
            serde_json::to_string_pretty(table).map_err(|e| MrfError::Serialize(e.to_string()))
        }
        DumpFormat::Yaml => {
            serde_yaml::to_string(table).map_err(|e| MrfError::Serialize(e.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
