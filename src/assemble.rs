// src/assemble.rs

//! Turns classified grids into labeled records.

use std::collections::BTreeMap;
use tracing::debug;

use crate::extract::{Extraction, Region};
use crate::fields::Field;
use crate::normalize::NormalizedGrid;

/// Where a record came from. Always present on every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Originating document: PDF file name or page URL.
    pub source: String,
    pub region: Region,
}

/// One labeled output row. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<Field, String>,
    provenance: Provenance,
}

impl Record {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Present fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn source(&self) -> &str {
        &self.provenance.source
    }

    /// True for the placeholder record of a text page nothing was recognized on.
    pub fn is_provenance_only(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One record per data row of `normalized`, in row order. Rows whose mapped
/// cells are all empty are dropped; empty cells never become keys.
/// `event_date` fills EVENT_DATE on rows that do not carry one.
pub fn assemble(
    normalized: &NormalizedGrid,
    provenance: &Provenance,
    event_date: Option<&str>,
) -> Vec<Record> {
    let mut records = Vec::with_capacity(normalized.grid.rows.len());
    for row in &normalized.grid.rows {
        let mut fields: BTreeMap<Field, String> = normalized
            .mapping
            .iter()
            .filter_map(|(field, col)| {
                row.get(col)
                    .filter(|v| !v.is_empty())
                    .map(|v| (field, v.clone()))
            })
            .collect();
        if fields.is_empty() {
            continue;
        }
        if let Some(date) = event_date.filter(|d| !d.is_empty()) {
            fields
                .entry(Field::EventDate)
                .or_insert_with(|| date.to_string());
        }
        records.push(Record {
            fields,
            provenance: provenance.clone(),
        });
    }
    records
}

/// [`assemble`] for one extracted region of `source`. A text-fallback page
/// that carried text but produced no records still yields one
/// provenance-only record, so the page shows up in the output.
pub fn assemble_extraction(
    extraction: &Extraction,
    normalized: &NormalizedGrid,
    source: &str,
    event_date: Option<&str>,
) -> Vec<Record> {
    let provenance = Provenance {
        source: source.to_string(),
        region: extraction.region().clone(),
    };
    let records = assemble(normalized, &provenance, event_date);
    if records.is_empty() && extraction.is_fallback() && !extraction.grid().is_blank() {
        debug!(source, region = %provenance.region, "nothing recognized on text page");
        return vec![Record {
            fields: BTreeMap::new(),
            provenance,
        }];
    }
    records
}
