//! Outstanding CLI binary.
//!
//! Loads an outstanding upload, normalizes it and prints or exports the
//! dashboard figures.

mod filters;

use clap::{Parser, Subcommand, ValueEnum};
use filters::FilterArgs;
use outstanding::analytics::{AggregationResult, Scale, available_views};
use outstanding::output::{ExportFormat, Exporter, group_thousands};
use outstanding::{Config, Filtered, Session};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "outstanding")]
#[command(about = "Outstanding guarantee dashboard from CSV or spreadsheet uploads", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/outstanding/config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show columns, a preview, dropped rows, category values and the period range
    Inspect {
        /// Upload file (.csv or spreadsheet)
        file: PathBuf,

        /// Number of preview rows
        #[arg(long, default_value = "5")]
        rows: usize,
    },

    /// Print KPIs and every dashboard view
    Summary {
        /// Upload file (.csv or spreadsheet)
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Divisor for monetary figures
        #[arg(long, default_value = "unit")]
        scale: Scale,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: SummaryFormat,
    },

    /// Write the filtered table
    Export {
        /// Upload file (.csv or spreadsheet)
        file: PathBuf,

        /// Output path
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format (default: from the output extension, else csv)
        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// List the registered views
    Views,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Views => list_views(),
        Commands::Inspect { file, rows } => {
            let session = open(&file, cli.config.as_deref())?;
            inspect(&session, rows);
        }
        Commands::Summary {
            file,
            filters,
            scale,
            format,
        } => {
            let session = open(&file, cli.config.as_deref())?;
            summary(&session, &filters, scale, format)?;
        }
        Commands::Export {
            file,
            out,
            filters,
            format,
        } => {
            let session = open(&file, cli.config.as_deref())?;
            let format = match format {
                Some(format) => format,
                None => ExportFormat::from_path(&out).unwrap_or_default(),
            };
            export(&session, &filters, &out, format)?;
        }
    }

    Ok(())
}

fn open(file: &Path, config: Option<&Path>) -> Result<Session, Box<dyn std::error::Error>> {
    let config = Config::resolve(config)?;
    debug!(file = %file.display(), "opening upload");
    Ok(Session::open(file, config)?)
}

fn list_views() {
    println!("Views:");
    println!("======\n");
    for info in available_views() {
        println!("{:<20} {}", info.name, info.description);
    }
}

fn inspect(session: &Session, rows: usize) {
    let raw = session.raw();
    let dataset = session.dataset();
    let report = session.report();

    println!("Source: {}", session.source());
    println!("Columns: {}", raw.columns().join(", "));

    println!("\nPreview ({} of {} rows):", raw.head(rows).len(), raw.len());
    println!("{}", "-".repeat(80));
    for record in raw.head(rows) {
        let cells: Vec<String> = record.iter().map(|(_, cell)| cell.to_string()).collect();
        println!("{}", cells.join(" | "));
    }

    println!(
        "\nRows: {} total, {} kept, {} dropped",
        report.total_rows,
        report.kept_count(),
        report.dropped_count()
    );
    for dropped in &report.dropped {
        println!("  row {}: {}", dropped.index + 1, dropped.reason);
    }

    if !dataset.category_domains().is_empty() {
        println!("\nCategories:");
        for (column, values) in dataset.category_domains() {
            println!("  {}: {}", column, values.join(", "));
        }
    }

    let labels = &session.config().policy.labels;
    match (dataset.period_range(), dataset.date_range()) {
        (Some((first, last)), Some((start, end))) => println!(
            "\nPeriods: {} .. {} ({} .. {})",
            first.label(labels),
            last.label(labels),
            start,
            end
        ),
        _ => println!("\nPeriods: none (no usable rows)"),
    }
}

fn summary(
    session: &Session,
    filters: &FilterArgs,
    scale: Scale,
    format: SummaryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = filters.apply(session.default_filter())?;

    match session.filter(&spec) {
        Filtered::NoData => {
            println!("No usable rows in {}", session.source());
            return Ok(());
        }
        Filtered::Empty => {
            println!("No records match the filter");
            return Ok(());
        }
        Filtered::Data(_) => {}
    }

    let Some(report) = session.dashboard(&spec, scale)? else {
        return Ok(());
    };

    match format {
        SummaryFormat::Json => println!("{}", report.to_json()?),
        SummaryFormat::Text => {
            println!("Source: {}", report.source);
            if report.dropped_rows > 0 {
                println!("Dropped rows: {}", report.dropped_rows);
            }
            println!();
            print!("{}", report.kpis);
            for (name, result) in &report.views {
                println!("\n{name}");
                println!("{}", "-".repeat(60));
                print_result(result);
            }
        }
    }
    Ok(())
}

fn print_result(result: &AggregationResult) {
    let header = result.group_columns.join(" / ");
    println!("{:<36} {:>22}", header, result.value_column);
    for row in &result.rows {
        let keys: Vec<String> = row.keys.iter().map(ToString::to_string).collect();
        let decimals = if row.value.fract().abs() > 0.0 { 2 } else { 0 };
        println!(
            "{:<36} {:>22}",
            keys.join(" / "),
            group_thousands(row.value, decimals)
        );
    }
}

fn export(
    session: &Session,
    filters: &FilterArgs,
    out: &Path,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = filters.apply(session.default_filter())?;

    let dataset = match session.filter(&spec) {
        Filtered::Data(dataset) => dataset,
        Filtered::Empty => {
            println!("No records match the filter; writing header only");
            session.dataset().with_records(Vec::new())
        }
        Filtered::NoData => {
            println!("No usable rows in {}; writing header only", session.source());
            session.dataset().with_records(Vec::new())
        }
    };

    dataset.export_to_file(out, format)?;
    println!(
        "Wrote {} rows to {} ({})",
        dataset.len(),
        out.display(),
        format.extension()
    );
    Ok(())
}
