use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use meetscraper::{
    fetch,
    fields::FieldSpec,
    output::{csv as csv_out, RecordLayout},
    pipeline,
};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Extract meet results from HTML result pages and PDF files into CSV"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
    /// JSON field vocabulary to use instead of the built-in one
    #[arg(long, global = true)]
    field_spec: Option<PathBuf>,
    /// Add the YEAR (class year) field
    #[arg(long, global = true)]
    with_year: bool,
    /// -v for debug, -vv for trace (RUST_LOG wins when set)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every table of one results page
    Html {
        url: String,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Base name of the output files (default: derived from the URL)
        #[arg(long)]
        base: Option<String>,
        /// Also write each table to its own CSV
        #[arg(long)]
        per_table: bool,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Extract results from every PDF in a folder
    Pdf {
        folder: PathBuf,
        #[arg(short, long, default_value = "extracted_data.csv")]
        output: PathBuf,
        /// Worker threads for PDF parsing
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_level = match args.verbose {
        0 => "info",
        1 => "info,meetscraper=debug",
        _ => "info,meetscraper=trace",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) field vocabulary ─────────────────────────────────────────
    let spec = match &args.field_spec {
        Some(path) => FieldSpec::from_json_file(path, args.with_year)?,
        None => FieldSpec::standard(args.with_year)?,
    };
    info!(fields = spec.fields().count(), "field spec loaded");

    // ─── 3) run ──────────────────────────────────────────────────────
    match args.command {
        Command::Html {
            url,
            out_dir,
            base,
            per_table,
            timeout,
        } => run_html(&url, &out_dir, base, per_table, timeout, &spec),
        Command::Pdf {
            folder,
            output,
            jobs,
        } => run_pdf(&folder, &output, jobs, &spec),
    }
}

fn run_html(
    raw_url: &str,
    out_dir: &Path,
    base: Option<String>,
    per_table: bool,
    timeout: u64,
    spec: &FieldSpec,
) -> Result<()> {
    let url = fetch::parse_page_url(raw_url)?;
    let client = fetch::build_client(Duration::from_secs(timeout))?;
    let base = base.unwrap_or_else(|| fetch::output_stem(&url));

    let outcome = pipeline::process_url(&client, &url, spec);
    let (batch, tables) = pipeline::batch_from_outcome(url.as_str(), outcome);

    if tables.is_empty() {
        warn!("no tables found, nothing written");
        println!("{}", batch.summary);
        return Ok(());
    }

    if per_table {
        for (region, grid) in &tables {
            let path = out_dir.join(format!("{}_{}.csv", base, region.label()));
            csv_out::write_raw_table(&path, grid)?;
        }
    }

    let named: Vec<(String, &_)> = tables.iter().map(|(r, g)| (r.label(), g)).collect();
    csv_out::write_combined_raw_file(&out_dir.join(format!("{}_combined.csv", base)), &named)?;

    let records_path = out_dir.join(format!("{}_records.csv", base));
    csv_out::write_records_file(&records_path, &batch.records, &RecordLayout::new(spec, true))
        .with_context(|| format!("saving records for {}", url))?;

    println!("{}", batch.summary);
    Ok(())
}

fn run_pdf(folder: &Path, output: &Path, jobs: usize, spec: &FieldSpec) -> Result<()> {
    let batch = pipeline::process_pdf_folder(folder, spec, jobs.max(1))?;
    if batch.records.is_empty() {
        warn!("no records extracted, nothing written");
    } else {
        csv_out::write_records_file(output, &batch.records, &RecordLayout::new(spec, false))?;
    }
    println!("{}", batch.summary);
    Ok(())
}
