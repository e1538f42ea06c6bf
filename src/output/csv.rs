// src/output/csv.rs

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};
use tracing::info;

use crate::assemble::Record;
use crate::extract::RawGrid;
use crate::fields::{Field, FieldSpec};

pub const SOURCE_COLUMN: &str = "SOURCE_FILE";
pub const TABLE_COLUMN: &str = "TABLE";

/// Column layout of the records CSV:
/// `[TABLE,] PL, NAME, [YEAR,] TEAM, TIME, SOURCE_FILE, [EVENT_DATE]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<Field>,
    with_table: bool,
}

impl RecordLayout {
    /// Every field of `spec` in column order; `with_table` prefixes the
    /// table identification column.
    pub fn new(spec: &FieldSpec, with_table: bool) -> Self {
        let mut fields: Vec<Field> = spec.fields().collect();
        fields.sort();
        Self { fields, with_table }
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut cols = Vec::with_capacity(self.fields.len() + 2);
        if self.with_table {
            cols.push(TABLE_COLUMN);
        }
        for f in self.fields.iter().filter(|f| **f != Field::EventDate) {
            cols.push(f.column_label());
        }
        cols.push(SOURCE_COLUMN);
        if self.fields.contains(&Field::EventDate) {
            cols.push(Field::EventDate.column_label());
        }
        cols
    }

    pub fn row(&self, record: &Record) -> Vec<String> {
        let mut out = Vec::with_capacity(self.fields.len() + 2);
        if self.with_table {
            out.push(record.provenance().region.label());
        }
        for f in self.fields.iter().filter(|f| **f != Field::EventDate) {
            out.push(record.get(*f).unwrap_or_default().to_string());
        }
        out.push(record.source().to_string());
        if self.fields.contains(&Field::EventDate) {
            out.push(record.get(Field::EventDate).unwrap_or_default().to_string());
        }
        out
    }
}

/// Write `records` with a header line. Returns the number of data rows.
pub fn write_records<W: Write>(writer: W, records: &[Record], layout: &RecordLayout) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(layout.header())
        .context("writing CSV header")?;
    for record in records {
        wtr.write_record(layout.row(record))
            .context("writing CSV record")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(records.len())
}

pub fn write_records_file(path: &Path, records: &[Record], layout: &RecordLayout) -> Result<usize> {
    let file = create(path)?;
    let n = write_records(file, records, layout)?;
    info!(path = %path.display(), rows = n, "records saved");
    Ok(n)
}

/// One table as-is: its header (if any) followed by its rows.
pub fn write_raw_table(path: &Path, grid: &RawGrid) -> Result<()> {
    let file = create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    if let Some(header) = &grid.header {
        wtr.write_record(header)?;
    }
    for row in &grid.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = grid.rows.len(), "table saved");
    Ok(())
}

/// All tables in one file: `Table_Name, Row_Number, Column_0..`, padded to
/// the widest table. Row numbers are 1-based per table; headers are not rows.
pub fn write_combined_raw<W: Write>(writer: W, tables: &[(String, &RawGrid)]) -> Result<usize> {
    let width = tables.iter().map(|(_, g)| g.width()).max().unwrap_or(0);
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Table_Name".to_string(), "Row_Number".to_string()];
    header.extend((0..width).map(|i| format!("Column_{}", i)));
    wtr.write_record(&header).context("writing CSV header")?;

    let mut written = 0;
    for (name, grid) in tables {
        for (i, row) in grid.rows.iter().enumerate() {
            let mut line = Vec::with_capacity(width + 2);
            line.push(name.clone());
            line.push((i + 1).to_string());
            line.extend(row.iter().cloned());
            line.resize(width + 2, String::new());
            wtr.write_record(&line)?;
            written += 1;
        }
    }
    wtr.flush()?;
    Ok(written)
}

pub fn write_combined_raw_file(path: &Path, tables: &[(String, &RawGrid)]) -> Result<usize> {
    let file = create(path)?;
    let n = write_combined_raw(file, tables)?;
    info!(path = %path.display(), rows = n, "combined tables saved");
    Ok(n)
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {:?}", parent))?;
    }
    File::create(path).with_context(|| format!("creating {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{assemble, Provenance};
    use crate::extract::Region;
    use crate::normalize::normalize;
    use anyhow::Result;
    use tempfile::tempdir;

    fn sample_records(spec: &FieldSpec) -> Vec<Record> {
        let grid = RawGrid::new(
            Some(vec!["Place".into(), "Name".into(), "Team".into(), "Time".into()]),
            vec![
                vec!["1".into(), "John Smith".into(), "University A".into(), "21.45".into()],
                vec!["2".into(), "Jane, Doe".into(), "".into(), "21.80".into()],
            ],
        );
        let provenance = Provenance {
            source: "meet.pdf".into(),
            region: Region::HtmlTable {
                index: 1,
                name: "results".into(),
            },
        };
        assemble(&normalize(&grid, spec), &provenance, Some("Feb 23, 2024"))
    }

    #[test]
    fn standard_layout_order() -> Result<()> {
        let spec = FieldSpec::standard(false)?;
        let layout = RecordLayout::new(&spec, false);
        assert_eq!(
            layout.header(),
            vec!["PL", "NAME", "TEAM", "TIME", "SOURCE_FILE", "EVENT_DATE"]
        );
        let with_year = RecordLayout::new(&FieldSpec::standard(true)?, true);
        assert_eq!(
            with_year.header(),
            vec!["TABLE", "PL", "NAME", "YEAR", "TEAM", "TIME", "SOURCE_FILE", "EVENT_DATE"]
        );
        Ok(())
    }

    #[test]
    fn writes_records_csv() -> Result<()> {
        let spec = FieldSpec::standard(false)?;
        let records = sample_records(&spec);
        let mut buf = Vec::new();
        let n = write_records(&mut buf, &records, &RecordLayout::new(&spec, true))?;
        assert_eq!(n, 2);
        let text = String::from_utf8(buf)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "TABLE,PL,NAME,TEAM,TIME,SOURCE_FILE,EVENT_DATE");
        assert_eq!(
            lines[1],
            "results,1,John Smith,University A,21.45,meet.pdf,\"Feb 23, 2024\""
        );
        assert_eq!(
            lines[2],
            "results,2,\"Jane, Doe\",,21.80,meet.pdf,\"Feb 23, 2024\""
        );
        Ok(())
    }

    #[test]
    fn writes_raw_and_combined_files() -> Result<()> {
        let dir = tempdir()?;
        let a = RawGrid::new(
            Some(vec!["Place".into(), "Name".into()]),
            vec![vec!["1".into(), "A".into()]],
        );
        let b = RawGrid::new(None, vec![vec!["x".into()], vec!["y".into(), "z".into(), "w".into()]]);

        let table_path = dir.path().join("out").join("page_results.csv");
        write_raw_table(&table_path, &a)?;
        assert_eq!(fs::read_to_string(&table_path)?, "Place,Name\n1,A\n");

        let combined = dir.path().join("combined.csv");
        let n = write_combined_raw_file(&combined, &[("results".into(), &a), ("table_2".into(), &b)])?;
        assert_eq!(n, 3);
        let text = fs::read_to_string(&combined)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Table_Name,Row_Number,Column_0,Column_1,Column_2");
        assert_eq!(lines[1], "results,1,1,A,");
        assert_eq!(lines[2], "table_2,1,x,,");
        assert_eq!(lines[3], "table_2,2,y,z,w");
        Ok(())
    }
}
