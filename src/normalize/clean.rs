// src/normalize/clean.rs
use crate::extract::RawGrid;

/// Characters that render as nothing and are dropped outright.
fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{feff}' | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{2060}' | '\u{00ad}'
    )
}

/// Collapse all whitespace (NBSP included) to single spaces, drop control
/// and zero-width characters, trim. Idempotent.
pub fn clean_cell(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.chars() {
        if is_invisible(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

/// Clean every cell and right-pad the header and all rows with empty cells
/// to the grid's widest row.
pub fn clean_grid(grid: &RawGrid) -> RawGrid {
    let width = grid.width();
    let pad = |row: &[String]| -> Vec<String> {
        let mut cells: Vec<String> = row.iter().map(|c| clean_cell(c)).collect();
        cells.resize(width, String::new());
        cells
    };
    RawGrid {
        header: grid.header.as_deref().map(|h| pad(h)),
        rows: grid.rows.iter().map(|r| pad(r)).collect(),
    }
}
