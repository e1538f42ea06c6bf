// src/pipeline.rs

//! Document-level driver: extract, normalize and assemble every region of a
//! page or PDF, keeping per-document counts for the run summary.

use anyhow::{bail, Context, Result};
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use reqwest::blocking::Client;
use scraper::Html;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::assemble::{assemble_extraction, Record};
use crate::extract::{html, pdf::PdfDocument, Extraction, RawGrid, Region};
use crate::fetch::fetch_page;
use crate::fields::{pattern::find_date, FieldSpec};
use crate::normalize::normalize_extraction;
use crate::output::{DocumentReport, RunSummary};

/// Everything one document produced.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub report: DocumentReport,
    pub records: Vec<Record>,
    /// Cleaned grid of every region, in document order.
    pub tables: Vec<(Region, RawGrid)>,
}

/// Records of a whole run plus its summary.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<Record>,
    pub summary: RunSummary,
}

impl Batch {
    fn add(&mut self, outcome: DocumentOutcome) {
        self.records.extend(outcome.records);
        self.summary.push_document(outcome.report);
    }

    fn finish(mut self) -> Self {
        self.summary.set_preview(&self.records);
        self
    }
}

fn process_regions<I>(source: &str, regions: I, spec: &FieldSpec, event_date: Option<&str>) -> DocumentOutcome
where
    I: Iterator<Item = Extraction>,
{
    let mut report = DocumentReport {
        source: source.to_string(),
        ..Default::default()
    };
    let mut records = Vec::new();
    let mut tables = Vec::new();

    for extraction in regions {
        report.regions += 1;
        if extraction.is_fallback() {
            report.fallback_pages += 1;
        }
        let normalized = normalize_extraction(&extraction, spec);
        let found = assemble_extraction(&extraction, &normalized, source, event_date);
        if found.iter().all(Record::is_provenance_only) {
            report.empty_regions += 1;
        }
        debug!(
            region = %extraction.region(),
            mapped = normalized.mapping.len(),
            records = found.len(),
            "region processed"
        );
        records.extend(found);
        tables.push((extraction.region().clone(), normalized.grid));
    }

    report.records = records.len();
    DocumentOutcome {
        report,
        records,
        tables,
    }
}

/// Process one HTML page already in memory. `source` is the page URL.
#[instrument(level = "info", skip(page, spec))]
pub fn process_html(source: &str, page: &str, spec: &FieldSpec) -> DocumentOutcome {
    let doc = Html::parse_document(page);
    let event_date = find_date(&html::document_text(&doc));
    if let Some(date) = &event_date {
        debug!(%date, "event date found");
    }
    let outcome = process_regions(source, html::tables(&doc, spec), spec, event_date.as_deref());
    info!(
        tables = outcome.report.regions,
        records = outcome.report.records,
        "page processed"
    );
    outcome
}

/// Fetch `url` and process it.
pub fn process_url(client: &Client, url: &Url, spec: &FieldSpec) -> Result<DocumentOutcome> {
    let page = fetch_page(client, url)?;
    Ok(process_html(url.as_str(), &page, spec))
}

#[instrument(level = "info", skip(doc, spec), fields(file = doc.name()))]
pub fn process_pdf(doc: &PdfDocument, spec: &FieldSpec) -> DocumentOutcome {
    let event_date = find_date(&doc.full_text());
    let mut outcome = process_regions(doc.name(), doc.regions(), spec, event_date.as_deref());
    outcome.report.unreadable_pages = doc.unreadable_pages().len();
    info!(
        pages = doc.page_count(),
        regions = outcome.report.regions,
        records = outcome.report.records,
        "PDF processed"
    );
    outcome
}

pub fn process_pdf_file(path: &Path, spec: &FieldSpec) -> Result<DocumentOutcome> {
    let doc = PdfDocument::open(path)?;
    Ok(process_pdf(&doc, spec))
}

/// `*.pdf` files directly inside `folder` (extension matched case-insensitively), sorted.
pub fn list_pdfs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        bail!("folder {:?} does not exist", folder);
    }
    let pattern = format!("{}/*.pdf", Pattern::escape(&folder.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };
    let mut paths: Vec<PathBuf> = glob::glob_with(&pattern, options)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(p) if p.is_file() => Some(p),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "unreadable directory entry");
                None
            }
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Apply `f` to every item, in a pool of `jobs` threads when `jobs > 1`.
/// Results come back in item order either way.
pub fn map_ordered<T, R, F>(items: &[T], jobs: usize, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if jobs <= 1 {
        return Ok(items.iter().map(f).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("building worker pool")?;
    Ok(pool.install(|| items.par_iter().map(|item| f(item)).collect()))
}

/// Process every PDF of `folder`. Files that cannot be opened are recorded
/// as skipped; only a missing folder is an error.
#[instrument(level = "info", skip(spec))]
pub fn process_pdf_folder(folder: &Path, spec: &FieldSpec, jobs: usize) -> Result<Batch> {
    let paths = list_pdfs(folder)?;
    if paths.is_empty() {
        warn!("no PDF files found");
    } else {
        info!(files = paths.len(), jobs, "processing PDF files");
    }

    let outcomes = map_ordered(&paths, jobs, |p| process_pdf_file(p, spec))?;

    let mut batch = Batch::default();
    for (path, outcome) in paths.iter().zip(outcomes) {
        match outcome {
            Ok(o) => batch.add(o),
            Err(e) => {
                let source = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                warn!(file = %source, error = %format!("{:#}", e), "skipping document");
                batch.summary.push_skipped(source, format!("{:#}", e));
            }
        }
    }
    Ok(batch.finish())
}

/// Single-document batch; a failed fetch becomes a skipped document.
pub fn batch_from_outcome(source: &str, outcome: Result<DocumentOutcome>) -> (Batch, Vec<(Region, RawGrid)>) {
    let mut batch = Batch::default();
    let mut tables = Vec::new();
    match outcome {
        Ok(mut o) => {
            tables = std::mem::take(&mut o.tables);
            batch.add(o);
        }
        Err(e) => {
            warn!(source, error = %format!("{:#}", e), "skipping document");
            batch.summary.push_skipped(source, format!("{:#}", e));
        }
    }
    (batch.finish(), tables)
}
