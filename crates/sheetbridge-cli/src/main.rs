//! Sheetbridge CLI - compile tabular data into editor task plans

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetbridge_writer::codec::{column_index, column_label};
use sheetbridge_writer::{BorderToEnd, CellOptions, Document, Plan, SheetOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetbridge")]
#[command(
    author,
    version,
    about = "Compile spreadsheet data into instruction plans for a hosted editor"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a CSV file into the task plan that writes it
    Plan {
        /// Input CSV file
        input: PathBuf,

        /// Target sheet name (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Treat the first row as bold titles
        #[arg(short, long)]
        titles: bool,

        /// Round numbers to this many decimals
        #[arg(short, long)]
        precision: Option<u32>,

        /// Hide grid lines
        #[arg(long)]
        no_grid: bool,

        /// Border the written range
        #[arg(short, long)]
        border: bool,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Convert between a 0-based column index and its label
    Col {
        /// Column index (e.g. 27) or label (e.g. AB)
        column: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Each task as a commented function body
    Text,
    /// JSON array of task bodies
    Json,
}

struct PlanArgs {
    sheet: Option<String>,
    titles: bool,
    precision: Option<u32>,
    no_grid: bool,
    border: bool,
    delimiter: char,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            sheet,
            titles,
            precision,
            no_grid,
            border,
            delimiter,
            format,
        } => {
            let args = PlanArgs {
                sheet,
                titles,
                precision,
                no_grid,
                border,
                delimiter,
            };
            let plan = compile(&input, &args)?;
            print_plan(&plan, format)
        }
        Commands::Col { column } => convert_column(&column),
    }
}

fn compile(input: &Path, args: &PlanArgs) -> Result<Plan> {
    if !args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(args.delimiter as u8)
        .from_path(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let options = SheetOptions {
        border_to_end: args.border.then(BorderToEnd::default),
        show_grid_lines: !args.no_grid,
        ..SheetOptions::default()
    };
    let mut doc = Document::with_options(options);
    let sheet = match &args.sheet {
        Some(name) => doc.sheet(name),
        None => doc.active(),
    };

    let title_style = CellOptions::new().with_bold(true);
    let mut rows = 0usize;
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", i + 1))?;
        if i == 0 && args.titles {
            sheet.titles(record.iter(), title_style.clone());
            continue;
        }
        sheet.row();
        for field in record.iter() {
            // numeric-looking fields become number cells
            match (field.trim().parse::<f64>(), args.precision) {
                (Ok(n), Some(p)) if n.is_finite() => {
                    sheet.number(format!("{:.*}", p as usize, n), None)
                }
                (Ok(n), None) if n.is_finite() => sheet.number(n, None),
                _ => sheet.cell(field, None),
            };
        }
        rows += 1;
    }
    debug!(rows, "read input rows");

    let plan = doc.build().context("Failed to compile plan")?;
    info!(tasks = plan.len(), "compiled plan");
    Ok(plan)
}

fn print_plan(plan: &Plan, format: OutputFormat) -> Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => {
            for (i, task) in plan.iter().enumerate() {
                writeln!(out, "// task {}: {:?}", i + 1, task.kind())?;
                writeln!(out, "{}", task.body())?;
            }
        }
        OutputFormat::Json => {
            let bodies: Vec<&str> = plan.iter().map(|task| task.body()).collect();
            let json = serde_json::to_string_pretty(&bodies).context("Failed to encode plan")?;
            writeln!(out, "{}", json)?;
        }
    }
    out.flush().context("Failed to write to stdout")
}

fn convert_column(column: &str) -> Result<()> {
    let column = column.trim();
    if let Ok(index) = column.parse::<u32>() {
        println!("{}", column_label(index));
        return Ok(());
    }
    match column_index(&column.to_ascii_uppercase()) {
        Some(index) => {
            println!("{}", index);
            Ok(())
        }
        None => bail!("'{}' is neither a column index nor a column label", column),
    }
}
