// src/normalize/classify.rs

//! Column classification as an ordered list of rules. Each rule only sees
//! the fields and columns left unmapped by the rules before it.

use std::collections::BTreeMap;
use tracing::trace;

use crate::extract::RawGrid;
use crate::fields::{Field, FieldSpec};

/// Data cells sampled per column by the value-pattern rule.
pub const SAMPLE_ROWS: usize = 10;

/// Share of sampled cells that must match before a column is assigned.
pub const MIN_MATCH_RATIO: f64 = 0.6;

/// Partial assignment of fields to column indices, injective both ways.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<Field, usize>,
}

impl ColumnMapping {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn column_taken(&self, col: usize) -> bool {
        self.columns.values().any(|&c| c == col)
    }

    /// `(field, column)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.columns.iter().map(|(f, c)| (*f, *c))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn assign(&mut self, field: Field, col: usize) {
        self.columns.insert(field, col);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Header cell text is one of the field's aliases.
    HeaderAlias,
    /// Sampled data cells have the field's value shape.
    ValuePattern,
}

/// Rules in priority order.
pub const RULES: [Rule; 2] = [Rule::HeaderAlias, Rule::ValuePattern];

/// Classify the columns of an already cleaned and padded grid.
pub fn classify(grid: &RawGrid, spec: &FieldSpec) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    for rule in RULES {
        match rule {
            Rule::HeaderAlias => by_header(grid, spec, &mut mapping),
            Rule::ValuePattern => by_pattern(grid, spec, &mut mapping),
        }
    }
    mapping
}

fn by_header(grid: &RawGrid, spec: &FieldSpec, mapping: &mut ColumnMapping) {
    let Some(header) = &grid.header else {
        return;
    };
    for (col, text) in header.iter().enumerate() {
        if let Some(field) = spec.field_for_header(text) {
            if !mapping.contains(field) {
                trace!(%field, col, header = %text, "header match");
                mapping.assign(field, col);
            }
        }
    }
}

fn by_pattern(grid: &RawGrid, spec: &FieldSpec, mapping: &mut ColumnMapping) {
    let width = grid.width();
    for (field, matcher) in spec.patterned() {
        if mapping.contains(field) {
            continue;
        }

        // strict `>` keeps the left-most column on ties
        let mut best: Option<(usize, f64)> = None;
        for col in (0..width).filter(|&c| !mapping.column_taken(c)) {
            let sample: Vec<&str> = grid
                .rows
                .iter()
                .filter_map(|r| r.get(col).map(String::as_str))
                .filter(|c| !c.is_empty())
                .take(SAMPLE_ROWS)
                .collect();
            if sample.is_empty() {
                continue;
            }
            let hits = sample.iter().filter(|c| matcher.matches(c)).count();
            let ratio = hits as f64 / sample.len() as f64;
            if ratio >= MIN_MATCH_RATIO && best.map_or(true, |(_, b)| ratio > b) {
                best = Some((col, ratio));
            }
        }

        if let Some((col, ratio)) = best {
            trace!(%field, col, ratio, "pattern match");
            mapping.assign(field, col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, ValuePattern};
    use crate::normalize::clean::clean_grid;

    fn grid(header: Option<&[&str]>, rows: &[&[&str]]) -> RawGrid {
        clean_grid(&RawGrid::new(
            header.map(|h| h.iter().map(|s| s.to_string()).collect()),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        ))
    }

    #[test]
    fn header_aliases_win_and_unknown_headers_stay_unmapped() {
        let spec = FieldSpec::standard(false).unwrap();
        let g = grid(
            Some(&["Place", "Name", "Team", "Time", "Heat"]),
            &[&["1", "John Smith", "University A", "21.45", "1"]],
        );
        let m = classify(&g, &spec);
        assert_eq!(m.get(Field::Place), Some(0));
        assert_eq!(m.get(Field::Name), Some(1));
        assert_eq!(m.get(Field::Team), Some(2));
        assert_eq!(m.get(Field::Time), Some(3));
        assert!(!m.column_taken(4));
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn patterns_classify_headerless_columns() {
        let spec = FieldSpec::standard(false).unwrap();
        let g = grid(
            None,
            &[
                &["Smith", "1", "21.45", "2024-02-23"],
                &["Doe", "2", "21.80", "2024-02-23"],
                &["Roe", "3", "1:02.10", "2024-02-24"],
            ],
        );
        let m = classify(&g, &spec);
        assert_eq!(m.get(Field::Place), Some(1));
        assert_eq!(m.get(Field::Time), Some(2));
        assert_eq!(m.get(Field::EventDate), Some(3));
        assert_eq!(m.get(Field::Name), None);
    }

    #[test]
    fn left_most_column_wins_ties() {
        let spec = FieldSpec::standard(false).unwrap();
        let g = grid(None, &[&["21.45", "21.50"], &["22.01", "22.30"]]);
        let m = classify(&g, &spec);
        assert_eq!(m.get(Field::Time), Some(0));
        assert!(!m.column_taken(1));
    }

    #[test]
    fn below_threshold_is_not_assigned() {
        let spec = FieldSpec::standard(false).unwrap();
        let g = grid(None, &[&["21.45"], &["DNF"], &["DQ"]]);
        assert!(classify(&g, &spec).is_empty());
    }

    #[test]
    fn header_miss_falls_back_to_pattern() {
        let spec = FieldSpec::new(vec![
            FieldDef::new(Field::Name, &["NAME"], None),
            FieldDef::new(Field::Time, &["TIME"], Some(ValuePattern::Time)),
        ])
        .unwrap();
        let g = grid(Some(&["Name", "Seed", "Final"]), &[&["A", "22.00", "21.45"]]);
        let m = classify(&g, &spec);
        assert_eq!(m.get(Field::Name), Some(0));
        assert_eq!(m.get(Field::Time), Some(1));
    }
}
