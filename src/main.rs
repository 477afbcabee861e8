use clap::{Parser, Subcommand};
use sciport::cli::{self, ExportArgs, OutputFormat};
use sciport::error::SciportResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sciport")]
#[command(about = "Move tabular and gridded scientific data between FITS and Excel files")]
#[command(long_about = "Sciport - scientific data import/export

COMMANDS:
  info    - List datasets, shapes, components and units in files
  sheets  - List the sheets of an Excel workbook
  export  - Write a dataset to FITS (one image HDU per component) or .xlsx

EXAMPLES:
  sciport info cube.fits simple_data.xlsx
  sciport export simple_data.xlsx data2.fits --sheet Data2
  sciport export grid.fits masked.fits --subset 'x > 2' -c x -c y")]
#[command(version)]
struct Cli {
    /// Show debug logging (SCIPORT_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter, e.g. `sciport=debug`
    #[arg(long, env = "SCIPORT_LOG", hide_env_values = true, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List datasets and components in one or more files
    Info {
        /// FITS or Excel files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the sheets of an Excel workbook
    Sheets {
        /// Workbook path (.xlsx, .xlsm, .xlsb, .xls, .ods)
        file: PathBuf,
    },

    #[command(long_about = "Export a dataset to FITS or Excel.

FITS output writes one image HDU per numeric component (EXTNAME = component
name, BUNIT = units). Entries outside --subset are written as NaN.
Excel output writes one worksheet with a header row of component names.

The output format follows the file extension; paths without a known
extension are written as FITS unless --format is given.

SUBSET EXPRESSIONS:
  x > 2                 single clause
  x >= 1 & y < 10       clauses combine left to right with & and |
  ~x == 0               negated clause
  'flux density' > 1    quote names containing spaces or operators")]
    /// Export a dataset to FITS or Excel
    Export {
        /// Input file (FITS or Excel)
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Sheet to load from an Excel input
        #[arg(short, long)]
        sheet: Option<String>,

        /// Index of the dataset to export when the input holds several
        #[arg(short, long, default_value = "0")]
        dataset: usize,

        /// Component to export (repeatable); all when omitted
        #[arg(short = 'c', long = "component")]
        components: Vec<String>,

        /// Subset expression; entries outside it become NaN/blank
        #[arg(long)]
        subset: Option<String>,

        /// Output format (fits, xlsx); detected from the extension by default
        #[arg(short, long)]
        format: Option<String>,

        /// Fail instead of replacing an existing output file
        #[arg(long)]
        no_overwrite: bool,
    },
}

fn init_tracing(verbose: bool, filter: Option<&str>) {
    let default = if verbose { "sciport=debug" } else { "sciport=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter.unwrap_or(default)))
        .init();
}

fn main() -> SciportResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log.as_deref());

    match cli.command {
        Commands::Info { files, format } => cli::info(files, format),
        Commands::Sheets { file } => cli::sheets(file),
        Commands::Export {
            input,
            output,
            sheet,
            dataset,
            components,
            subset,
            format,
            no_overwrite,
        } => cli::export(ExportArgs {
            input,
            output,
            sheet,
            dataset,
            components,
            subset,
            format,
            no_overwrite,
            verbose: cli.verbose,
        }),
    }
}
