// src/extract/text.rs

//! Table detection on plain page text, for PDFs where the only structure
//! left is line breaks and spacing.
//!
//! Two detectors run in order:
//! 1. header-keyword tables: a `PL NAME TEAM TIME`-style header line opens
//!    a table, and following lines are split as results lines
//! 2. aligned-gap tables: runs of lines that split on wide gaps into the
//!    same number of cells

use once_cell::sync::Lazy;
use regex::Regex;

use super::RawGrid;
use crate::fields::pattern::is_class_year;

/// Lines after a header line that are still considered part of its table.
const MAX_TABLE_LINES: usize = 200;

/// Lines after a header that are probed for class-year tokens.
const YEAR_PROBE_LINES: usize = 5;

/// Minimum number of consecutive aligned lines to call a run a table.
const MIN_TABLE_ROWS: usize = 3;

const TEAM_KEYWORDS: &[&str] = &[
    "University",
    "Universidad",
    "College",
    "UPR",
    "P.R.",
    "Caribbean",
    "Interamerican",
    "Politecnica",
    "State",
    "Tech",
    "Institute",
];

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:PL|PLACE|POS|RANK)\s+\S").unwrap());
static SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z\s]+$").unwrap());
static RESULT_TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:[:.]\d+)*$").unwrap());
static GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Column layout produced by [`split_result_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLayout {
    /// `PL NAME TEAM TIME`
    Basic,
    /// `PL NAME YEAR TEAM TIME`
    WithYear,
}

impl LineLayout {
    pub fn header(&self) -> Vec<String> {
        let labels: &[&str] = match self {
            LineLayout::Basic => &["PL", "NAME", "TEAM", "TIME"],
            LineLayout::WithYear => &["PL", "NAME", "YEAR", "TEAM", "TIME"],
        };
        labels.iter().map(|s| s.to_string()).collect()
    }
}

/// Split one results line such as `1 John Smith University A 21.45` into
/// layout cells. Returns `None` for lines that do not look like a result.
pub fn split_result_line(line: &str, layout: LineLayout) -> Option<Vec<String>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let min_parts = match layout {
        LineLayout::Basic => 4,
        LineLayout::WithYear => 5,
    };
    if parts.len() < min_parts {
        return None;
    }

    let place = parts[0];
    let time = parts[parts.len() - 1];
    if !place.chars().all(|c| c.is_ascii_digit()) || !RESULT_TIME_RE.is_match(time) {
        return None;
    }

    let mut middle: Vec<&str> = parts[1..parts.len() - 1].to_vec();
    let mut year = String::new();
    if layout == LineLayout::WithYear {
        if let Some(i) = middle.iter().position(|p| is_class_year(p)) {
            year = middle.remove(i).to_string();
        }
    }
    if middle.len() < 2 {
        return None;
    }

    // team starts at the first token carrying a team keyword, else after two name tokens
    let split = middle
        .iter()
        .position(|p| TEAM_KEYWORDS.iter().any(|k| p.contains(k)))
        .filter(|&i| i > 0)
        .unwrap_or(2.min(middle.len() - 1));
    let name = middle[..split].join(" ");
    let team = middle[split..].join(" ");
    if name.len() <= 1 || team.len() <= 1 {
        return None;
    }

    let mut cells = vec![place.to_string(), name];
    if layout == LineLayout::WithYear {
        cells.push(year);
    }
    cells.push(team);
    cells.push(time.to_string());
    Some(cells)
}

/// Tables found in one page of text, in reading order.
pub fn detect_tables(text: &str) -> Vec<RawGrid> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let tables = header_tables(&lines);
    if !tables.is_empty() {
        return tables;
    }
    aligned_tables(&lines)
}

/// Re-split a text-fallback grid as results lines. `None` if no line splits.
/// Class-year tokens in the first lines switch to the year layout, so a
/// table continued from a previous page keeps its YEAR column.
pub fn split_fallback(grid: &RawGrid) -> Option<RawGrid> {
    let lines: Vec<String> = grid.rows.iter().map(|row| row.join(" ")).collect();
    let layout = probe_layout(lines.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = lines
        .iter()
        .filter_map(|line| match layout {
            LineLayout::Basic => split_result_line(line, LineLayout::Basic),
            LineLayout::WithYear => split_result_line(line, LineLayout::WithYear).or_else(|| {
                let mut cells = split_result_line(line, LineLayout::Basic)?;
                cells.insert(2, String::new());
                Some(cells)
            }),
        })
        .collect();
    if rows.is_empty() {
        None
    } else {
        Some(RawGrid::new(Some(layout.header()), rows))
    }
}

fn header_tables(lines: &[&str]) -> Vec<RawGrid> {
    let mut tables = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if !HEADER_RE.is_match(lines[i]) {
            i += 1;
            continue;
        }

        let layout = detect_layout(lines[i], &lines[i + 1..]);
        let end = (i + 1 + MAX_TABLE_LINES).min(lines.len());
        let mut rows = Vec::new();
        let mut j = i + 1;
        while j < end {
            let line = lines[j];
            if HEADER_RE.is_match(line) || (line.len() > 10 && SECTION_RE.is_match(line)) {
                break;
            }
            if let Some(cells) = split_result_line(line, layout) {
                rows.push(cells);
            }
            j += 1;
        }

        if !rows.is_empty() {
            tables.push(RawGrid::new(Some(layout.header()), rows));
        }
        i = j;
    }
    tables
}

/// `YEAR` in the header, or a class-year token in the first data lines.
fn detect_layout(header: &str, following: &[&str]) -> LineLayout {
    if header.to_uppercase().split_whitespace().any(|t| t == "YEAR") {
        return LineLayout::WithYear;
    }
    probe_layout(following.iter().copied())
}

/// Year layout when one of the first non-empty lines carries a class-year
/// token between its first and last token.
fn probe_layout<'a>(lines: impl Iterator<Item = &'a str>) -> LineLayout {
    let probed = lines
        .filter(|l| !l.is_empty())
        .take(YEAR_PROBE_LINES)
        .any(|l| {
            let parts: Vec<&str> = l.split_whitespace().collect();
            parts.len() >= 4 && parts[1..parts.len() - 1].iter().any(|p| is_class_year(p))
        });
    if probed {
        LineLayout::WithYear
    } else {
        LineLayout::Basic
    }
}

fn aligned_tables(lines: &[&str]) -> Vec<RawGrid> {
    let split: Vec<Vec<String>> = lines
        .iter()
        .map(|l| {
            GAP_RE
                .split(l)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect()
        })
        .collect();

    let mut tables = Vec::new();
    let mut start = 0;
    while start < split.len() {
        let width = split[start].len();
        let mut end = start + 1;
        while end < split.len() && split[end].len() == width {
            end += 1;
        }
        if width >= 2 && end - start >= MIN_TABLE_ROWS {
            let mut rows = split[start..end].to_vec();
            let first_is_header = !rows[0]
                .iter()
                .any(|c| c.chars().any(|ch| ch.is_ascii_digit()));
            let header = if first_is_header {
                Some(rows.remove(0))
            } else {
                None
            };
            tables.push(RawGrid::new(header, rows));
        }
        start = end;
    }
    tables
}
