// src/extract/html.rs

//! Table regions of an HTML page.

use scraper::{ElementRef, Html};
use std::collections::HashMap;
use tracing::{debug, trace};

use super::{Extraction, RawGrid, Region};
use crate::fields::FieldSpec;

const HEADING_KEYWORDS: &[&str] = &["result", "finish", "time", "place", "rank"];

/// Every `<table>` of `doc` in document order, nested tables included.
/// Tables without any data-bearing row are skipped. `spec` decides whether
/// an unmarked first row reads as a header.
pub fn tables<'a>(doc: &'a Html, spec: &'a FieldSpec) -> impl Iterator<Item = Extraction> + 'a {
    let mut last_heading: Option<String> = None;
    let mut index = 0usize;
    let mut names: HashMap<String, usize> = HashMap::new();

    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(move |el| match el.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                last_heading = Some(element_text(el));
                None
            }
            "table" => {
                index += 1;
                let name = unique_name(table_name(el, last_heading.as_deref(), index), &mut names);
                let grid = table_grid(el, spec);
                if grid.rows.is_empty() || grid.is_blank() {
                    debug!(table = %name, "skipping table without data rows");
                    return None;
                }
                trace!(table = %name, rows = grid.rows.len(), "found table");
                Some(Extraction::TableFound(grid, Region::HtmlTable { index, name }))
            }
            _ => None,
        })
}

/// Visible text of the whole page, for document-level lookups.
pub fn document_text(doc: &Html) -> String {
    doc.root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_grid(table: ElementRef<'_>, spec: &FieldSpec) -> RawGrid {
    let mut rows: Vec<(Vec<String>, bool)> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr" && owning_table(*e).map(|t| t.id()) == Some(table.id()))
        .map(|tr| (row_cells(tr), is_header_row(tr)))
        .filter(|(cells, _)| !cells.is_empty())
        .collect();

    // th/thead rows are headers; so is a digit-free first row naming a known field
    let first_is_header = rows.first().map_or(false, |(cells, marked)| {
        *marked
            || (!cells.iter().any(|c| c.chars().any(|ch| ch.is_ascii_digit()))
                && cells.iter().any(|c| spec.field_for_header(c).is_some()))
    });
    let header = if first_is_header {
        Some(rows.remove(0).0)
    } else {
        None
    };

    let rows = rows
        .into_iter()
        .map(|(cells, _)| cells)
        .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
        .collect();

    RawGrid::new(header, rows)
}

/// Nearest enclosing `<table>` of an element.
fn owning_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

/// Direct `td`/`th` children; `colspan=n` adds `n-1` empty cells.
fn row_cells(tr: ElementRef<'_>) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
    {
        cells.push(cell_text(cell));
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, 64);
        cells.extend(std::iter::repeat(String::new()).take(span - 1));
    }
    cells
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    let in_thead = tr
        .parent()
        .and_then(ElementRef::wrap)
        .map_or(false, |p| p.value().name() == "thead");
    let mut cells = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .peekable();
    let all_th = cells.peek().is_some() && cells.all(|c| c.value().name() == "th");
    in_thead || all_th
}

fn table_name(table: ElementRef<'_>, heading: Option<&str>, index: usize) -> String {
    let caption = table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "caption")
        .map(element_text)
        .filter(|t| !t.is_empty());
    if let Some(caption) = caption {
        return slug(&caption);
    }
    if let Some(h) = heading {
        let lower = h.to_lowercase();
        if HEADING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return slug(h);
        }
    }
    format!("table_{}", index)
}

fn unique_name(name: String, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(name.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        name
    } else {
        format!("{}_{}", name, count)
    }
}

/// Lowercase, spaces to `_`, anything unsafe in a filename dropped.
fn slug(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Text of a cell, leaving out tables nested inside it.
fn cell_text(cell: ElementRef<'_>) -> String {
    let parts: Vec<&str> = cell
        .descendants()
        .filter(|n| {
            !n.ancestors()
                .take_while(|a| a.id() != cell.id())
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name() == "table")
        })
        .filter_map(|n| n.value().as_text().map(|t| &**t))
        .collect();
    parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
