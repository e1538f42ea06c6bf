// src/output/summary.rs

use std::fmt;

use crate::assemble::Record;
use crate::fields::Field;

const PREVIEW_RECORDS: usize = 5;

/// Per-document counters collected while a document is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    pub source: String,
    /// Regions handed to the normalizer.
    pub regions: usize,
    /// PDF pages that went through the text fallback.
    pub fallback_pages: usize,
    /// Regions that produced no records.
    pub empty_regions: usize,
    /// PDF pages whose text could not be read.
    pub unreadable_pages: usize,
    pub records: usize,
}

/// A document that produced nothing because it failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub documents: Vec<DocumentReport>,
    pub skipped: Vec<SkippedDocument>,
    preview: Vec<Record>,
}

impl RunSummary {
    pub fn push_document(&mut self, report: DocumentReport) {
        self.documents.push(report);
    }

    pub fn push_skipped(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedDocument {
            source: source.into(),
            reason: reason.into(),
        });
    }

    /// Keep the first few non-placeholder records for the console preview.
    pub fn set_preview(&mut self, records: &[Record]) {
        self.preview = records
            .iter()
            .filter(|r| !r.is_provenance_only())
            .take(PREVIEW_RECORDS)
            .cloned()
            .collect();
    }

    pub fn total_records(&self) -> usize {
        self.documents.iter().map(|d| d.records).sum()
    }

    pub fn total_regions(&self) -> usize {
        self.documents.iter().map(|d| d.regions).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{}", rule)?;
        writeln!(f, "EXTRACTION SUMMARY")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Documents processed: {}", self.documents.len())?;
        writeln!(f, "Regions found: {}", self.total_regions())?;
        writeln!(f, "Records extracted: {}", self.total_records())?;

        for d in &self.documents {
            write!(
                f,
                "  {}: {} records from {} regions",
                d.source, d.records, d.regions
            )?;
            if d.fallback_pages > 0 {
                write!(f, ", {} text pages", d.fallback_pages)?;
            }
            if d.empty_regions > 0 {
                write!(f, ", {} without results", d.empty_regions)?;
            }
            if d.unreadable_pages > 0 {
                write!(f, ", {} unreadable pages", d.unreadable_pages)?;
            }
            writeln!(f)?;
        }

        if !self.skipped.is_empty() {
            writeln!(f, "Skipped documents: {}", self.skipped.len())?;
            for s in &self.skipped {
                writeln!(f, "  {}: {}", s.source, s.reason)?;
            }
        }

        if !self.preview.is_empty() {
            writeln!(f)?;
            writeln!(f, "First {} records:", self.preview.len())?;
            for r in &self.preview {
                let cells: Vec<String> = r
                    .fields()
                    .filter(|(field, _)| *field != Field::EventDate)
                    .map(|(field, v)| format!("{}={}", field.column_label(), v))
                    .collect();
                writeln!(f, "  {} [{}]", cells.join(" "), r.source())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{assemble, Provenance};
    use crate::extract::{RawGrid, Region};
    use crate::fields::FieldSpec;
    use crate::normalize::normalize;

    #[test]
    fn renders_counts_skips_and_preview() {
        let spec = FieldSpec::standard(false).unwrap();
        let grid = RawGrid::new(
            Some(vec!["Place".into(), "Name".into()]),
            (1..=7)
                .map(|i| vec![i.to_string(), format!("Runner {}", i)])
                .collect(),
        );
        let provenance = Provenance {
            source: "a.pdf".into(),
            region: Region::PdfTable { page: 1, index: 1 },
        };
        let records = assemble(&normalize(&grid, &spec), &provenance, None);

        let mut summary = RunSummary::default();
        summary.push_document(DocumentReport {
            source: "a.pdf".into(),
            regions: 2,
            fallback_pages: 1,
            empty_regions: 1,
            unreadable_pages: 0,
            records: records.len(),
        });
        summary.push_skipped("b.pdf", "not a PDF");
        summary.set_preview(&records);

        assert_eq!(summary.total_records(), 7);
        let text = summary.to_string();
        assert!(text.contains("Documents processed: 1"));
        assert!(text.contains("Records extracted: 7"));
        assert!(text.contains("a.pdf: 7 records from 2 regions, 1 text pages, 1 without results"));
        assert!(text.contains("b.pdf: not a PDF"));
        assert!(text.contains("First 5 records:"));
        assert!(text.contains("PL=1 NAME=Runner 1 [a.pdf]"));
        assert!(!text.contains("Runner 6"));
    }
}
