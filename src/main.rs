use clap::{ArgAction, Parser};
use mrf_parse::cli::{self, DumpFormat, RunArgs};
use mrf_parse::error::MrfResult;
use mrf_parse::types::Procedure;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mrf-parse")]
#[command(about = "Summarize MRFs' feedback, hours, and money (funds) data into another Excel file")]
#[command(long_about = "MRF Parse - Monthly Report Form summarizer

Reads every MRF workbook (.xls, .xlsx, .xlsm) in a folder and writes one
summary workbook:

PROCEDURES:
  feedback (f)  - DISTRICT BOARD FEEDBACK.xlsx     Feedback text per club
  hours    (h)  - TOTAL HOURS PER TENET.xlsx       Service/leadership/fellowship hours
  funds    (m)  - TOTAL FUNDS RAISED PER DFI.xlsx  PTP, Trevor Project, KFH, other charities

Summary files already in the input folder are never read back as input.

EXAMPLES:
  mrf-parse 12 2019 f                          # Feedback from MRFs in this folder
  mrf-parse 1 2020 m -i input/files -o output  # Funds from input/files into output
  mrf-parse 5 2020 h --year-to-date --skip-invalid")]
#[command(version)]
struct Cli {
    /// Month number (1-12)
    #[arg(value_parser = clap::value_parser!(u8).range(1..=12))]
    month: u8,

    /// Year number (only used in titles)
    year: i32,

    /// Procedure: [f]eedback, [h]ours, [m]oney (funds)
    #[arg(value_enum)]
    procedure: Procedure,

    /// Directory of MRF Excel files
    #[arg(short, long, env = "MRF_INDIR", default_value = ".")]
    indir: PathBuf,

    /// Directory to put the summary in
    #[arg(short, long, env = "MRF_OUTDIR", default_value = ".")]
    outdir: PathBuf,

    /// First month (1-12) of the fiscal year; orders the Annual Totals month rows
    #[arg(long, env = "MRF_FISCAL_START", default_value = "3",
          value_parser = clap::value_parser!(u8).range(1..=12))]
    fiscal_start: u8,

    /// Only total months from the fiscal year's start through MONTH
    #[arg(long)]
    year_to_date: bool,

    /// Skip broken MRFs with a warning instead of stopping the run
    #[arg(long)]
    skip_invalid: bool,

    /// Overwrite an existing summary without asking
    #[arg(short, long)]
    yes: bool,

    /// Author recorded in the summary's document properties
    #[arg(long, env = "MRF_AUTHOR", default_value = "mrf-parse")]
    author: String,

    /// Also print the extracted table to stdout
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// Show more detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "mrf_parse=info",
        1 => "mrf_parse=debug",
        _ => "mrf_parse=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> MrfResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli::run(RunArgs {
        month: cli.month,
        year: cli.year,
        procedure: cli.procedure,
        indir: cli.indir,
        outdir: cli.outdir,
        fiscal_start: cli.fiscal_start,
        year_to_date: cli.year_to_date,
        skip_invalid: cli.skip_invalid,
        yes: cli.yes,
        author: cli.author,
        dump: cli.dump,
    })?;

    Ok(())
}
