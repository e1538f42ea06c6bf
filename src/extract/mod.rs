// src/extract/mod.rs
pub mod html;
pub mod pdf;
pub mod text;

use std::fmt;

/// Unprocessed cells of one tabular region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn new(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Single-column grid, one row per non-empty line.
    pub fn from_lines(text: &str) -> Self {
        let rows = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| vec![l.to_string()])
            .collect();
        Self { header: None, rows }
    }

    /// Widest of the header and every row.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(self.header.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    /// True if no data row carries any non-blank cell.
    pub fn is_blank(&self) -> bool {
        self.rows
            .iter()
            .all(|r| r.iter().all(|c| c.trim().is_empty()))
    }
}

/// Where inside a document a grid came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// `index` is 1-based in document order.
    HtmlTable { index: usize, name: String },
    /// `page` and `index` are 1-based.
    PdfTable { page: u32, index: usize },
    /// Page text passed through because no table was detected.
    PdfText { page: u32 },
}

impl Region {
    /// Short label used for the table identification column and per-table files.
    pub fn label(&self) -> String {
        match self {
            Region::HtmlTable { name, .. } => name.clone(),
            Region::PdfTable { page, index } => format!("page{}_table{}", page, index),
            Region::PdfText { page } => format!("page{}_text", page),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One region yielded by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    TableFound(RawGrid, Region),
    TextFallback(RawGrid, Region),
}

impl Extraction {
    pub fn grid(&self) -> &RawGrid {
        match self {
            Extraction::TableFound(g, _) | Extraction::TextFallback(g, _) => g,
        }
    }

    pub fn region(&self) -> &Region {
        match self {
            Extraction::TableFound(_, r) | Extraction::TextFallback(_, r) => r,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Extraction::TextFallback(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_width_and_lines() {
        let g = RawGrid::from_lines("  1 John  \n\n2 Jane\n");
        assert_eq!(g.rows, vec![vec!["1 John".to_string()], vec!["2 Jane".to_string()]]);
        assert_eq!(g.width(), 1);
        let g = RawGrid::new(Some(vec!["a".into(); 3]), vec![vec!["x".into()]]);
        assert_eq!(g.width(), 3);
        assert!(!g.is_blank());
        assert!(RawGrid::new(None, vec![vec![" ".into()]]).is_blank());
    }

    #[test]
    fn region_labels() {
        assert_eq!(Region::PdfTable { page: 2, index: 1 }.label(), "page2_table1");
        assert_eq!(Region::PdfText { page: 3 }.to_string(), "page3_text");
    }
}
