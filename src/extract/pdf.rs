// src/extract/pdf.rs

//! Regions of a PDF file: detected text tables per page, or the page text
//! itself when nothing table-like is found.

use anyhow::{Context, Result};
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

use super::{text, Extraction, RawGrid, Region};

/// An opened PDF with its page texts already decoded.
#[derive(Debug)]
pub struct PdfDocument {
    name: String,
    pages: Vec<(u32, String)>,
    unreadable_pages: Vec<u32>,
}

impl PdfDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path).with_context(|| format!("opening PDF {:?}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_document(name, &doc))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let doc = Document::load_mem(bytes).with_context(|| format!("parsing PDF {}", name))?;
        Ok(Self::from_document(name, &doc))
    }

    /// Build from already-extracted page texts (1-based page numbers).
    pub fn from_pages(name: impl Into<String>, pages: Vec<(u32, String)>) -> Self {
        Self {
            name: name.into(),
            pages,
            unreadable_pages: Vec::new(),
        }
    }

    fn from_document(name: String, doc: &Document) -> Self {
        let mut pages = Vec::new();
        let mut unreadable_pages = Vec::new();
        for page_no in doc.get_pages().into_keys() {
            match doc.extract_text(&[page_no]) {
                Ok(t) => pages.push((page_no, t)),
                Err(e) => {
                    warn!(file = %name, page = page_no, error = %e, "skipping unreadable page");
                    unreadable_pages.push(page_no);
                }
            }
        }
        debug!(file = %name, pages = pages.len(), "decoded PDF text");
        Self {
            name,
            pages,
            unreadable_pages,
        }
    }

    /// File name, used as the records' SOURCE_FILE.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + self.unreadable_pages.len()
    }

    pub fn unreadable_pages(&self) -> &[u32] {
        &self.unreadable_pages
    }

    /// All page text joined in page order.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|(_, t)| t.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Regions in page order, lazily detected.
    pub fn regions(&self) -> impl Iterator<Item = Extraction> + '_ {
        self.pages
            .iter()
            .flat_map(|(page, text)| page_regions(*page, text))
    }
}

/// Detected tables of one page, or a single text-fallback grid. A page
/// without any text yields nothing.
pub fn page_regions(page: u32, page_text: &str) -> Vec<Extraction> {
    let tables = text::detect_tables(page_text);
    if !tables.is_empty() {
        return tables
            .into_iter()
            .enumerate()
            .map(|(i, grid)| Extraction::TableFound(grid, Region::PdfTable { page, index: i + 1 }))
            .collect();
    }

    let grid = RawGrid::from_lines(page_text);
    if grid.rows.is_empty() {
        debug!(page, "page has no text");
        return Vec::new();
    }
    debug!(page, lines = grid.rows.len(), "no table detected, passing page text through");
    vec![Extraction::TextFallback(grid, Region::PdfText { page })]
}
