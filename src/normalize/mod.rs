// src/normalize/mod.rs
pub mod classify;
pub mod clean;

pub use classify::ColumnMapping;

use crate::extract::{text, Extraction, RawGrid};
use crate::fields::FieldSpec;

/// A cleaned, equal-width grid together with its column classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedGrid {
    pub grid: RawGrid,
    pub mapping: ColumnMapping,
}

/// Clean `grid` and classify its columns against `spec`. Never fails;
/// ambiguous input yields a partial (possibly empty) mapping.
pub fn normalize(grid: &RawGrid, spec: &FieldSpec) -> NormalizedGrid {
    let grid = clean::clean_grid(grid);
    let mapping = classify::classify(&grid, spec);
    NormalizedGrid { grid, mapping }
}

/// Normalize one extracted region. Text-fallback grids are first re-split
/// as results lines when any of their lines allows it.
pub fn normalize_extraction(extraction: &Extraction, spec: &FieldSpec) -> NormalizedGrid {
    match extraction {
        Extraction::TableFound(grid, _) => normalize(grid, spec),
        Extraction::TextFallback(grid, _) => match text::split_fallback(&clean::clean_grid(grid)) {
            Some(split) => normalize(&split, spec),
            None => normalize(grid, spec),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Region;
    use crate::fields::Field;

    #[test]
    fn renormalizing_keeps_mapping() {
        let spec = FieldSpec::standard(true).unwrap();
        let grid = RawGrid::new(
            Some(vec![" Pl. ".into(), "Athlete\u{a0}Name".into(), "Yr".into()]),
            vec![
                vec!["1".into(), " John  Smith".into(), "SO-2".into(), "21.45".into()],
                vec!["2".into(), "Jane Doe".into()],
            ],
        );
        let first = normalize(&grid, &spec);
        let second = normalize(&first.grid, &spec);
        assert_eq!(first, second);
        assert_eq!(first.mapping.get(Field::Place), Some(0));
        assert_eq!(first.mapping.get(Field::Name), Some(1));
        assert_eq!(first.mapping.get(Field::Year), Some(2));
        assert_eq!(first.mapping.get(Field::Time), Some(3));
        assert_eq!(first.grid.rows[1].len(), 4);
    }

    #[test]
    fn fallback_lines_are_resplit() {
        let spec = FieldSpec::standard(false).unwrap();
        let ex = Extraction::TextFallback(
            RawGrid::from_lines("1 John Smith University A 21.45"),
            Region::PdfText { page: 1 },
        );
        let n = normalize_extraction(&ex, &spec);
        assert_eq!(n.mapping.len(), 4);
        assert_eq!(n.grid.rows[0][n.mapping.get(Field::Team).unwrap()], "University A");
    }

    #[test]
    fn unsplittable_fallback_is_left_single_column() {
        let spec = FieldSpec::standard(false).unwrap();
        let ex = Extraction::TextFallback(
            RawGrid::from_lines("Meet program\nsee you next year"),
            Region::PdfText { page: 1 },
        );
        let n = normalize_extraction(&ex, &spec);
        assert!(n.mapping.is_empty());
        assert_eq!(n.grid.width(), 1);
    }
}
