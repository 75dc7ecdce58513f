// SPDX-License-Identifier: GPL-3.0-or-later

// src/dataset/table.rs
//
// In-memory dataset table: one row per sample, string cells.
//
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{MedimgError, Result};

/// A dataset table as loaded from a `dataset.csv`.
///
/// Cells are kept as strings; label and subject values are compared
/// textually, the same way they appear in the CSV.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DatasetTable {
    /// Build a table from a header and rows. Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(MedimgError::invalid(format!("duplicate column '{}'", c)));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(MedimgError::Csv {
                    line: i + 2,
                    message: format!("expected {} fields, got {}", columns.len(), row.len()),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Convenience constructor for `&str` data, mostly for tests and fixtures.
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    /// Parse CSV text. The first record is the header; blank lines are skipped.
    ///
    /// Cells are kept exactly as written (no trimming), so a table written
    /// with [`write_csv`](Self::write_csv) reads back unchanged.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// Load a CSV file from disk.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    fn from_reader<R: io::Read>(source: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::None)
            .flexible(false)
            .from_reader(source);

        let columns: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            return Err(MedimgError::Csv {
                line: 1,
                message: "empty CSV, a header row is required".to_string(),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Parsed CSV table: {} columns, {} rows", columns.len(), rows.len());
        Self::new(columns, rows)
    }

    /// Render as CSV, header first, fields quoted only where needed.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| MedimgError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| MedimgError::Csv {
            line: 0,
            message: e.to_string(),
        })
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref()).map_err(csv_error)?;
        self.write_records(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_records<W: io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer.write_record(&self.columns).map_err(csv_error)?;
        for row in &self.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`column_index`](Self::column_index) but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| MedimgError::missing_column(name))
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Distinct values of one column in order of first appearance.
    pub fn unique_values(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.require_column(name)?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if seen.insert(row[idx].as_str()) {
                out.push(row[idx].clone());
            }
        }
        Ok(out)
    }

    /// New table with the same header and the rows for which `keep` is true.
    pub fn select_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[String]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    pub(crate) fn from_parts_unchecked(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }
}

/// I/O failures stay I/O errors; everything else becomes a `Csv` error
/// carrying the line the reader stopped at.
fn csv_error(err: csv::Error) -> MedimgError {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => MedimgError::Io(e),
        _ => MedimgError::Csv { line, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let csv = "subjectID,path,label\n1,img/1.png,0\n2,img/2.png,3\n";
        let table = DatasetTable::from_csv_str(csv).unwrap();
        assert_eq!(table.columns(), &["subjectID", "path", "label"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_values("label").unwrap(), vec!["0", "3"]);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let csv = "a,b\r\n\r\n1,2\r\n\n3,4\r\n";
        let table = DatasetTable::from_csv_str(csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["3", "4"]);
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "id,note\n1,\"hello, world\"\n2,\"say \"\"hi\"\"\"\n";
        let table = DatasetTable::from_csv_str(csv).unwrap();
        assert_eq!(table.rows()[0][1], "hello, world");
        assert_eq!(table.rows()[1][1], "say \"hi\"");

        let back = DatasetTable::from_csv_str(&table.to_csv_string().unwrap()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_multiline_and_padded_cells_survive_write() {
        let table = DatasetTable::from_rows(
            &["subjectID", "note"],
            &[&["1", "line1\nline2"], &[" 7", "trailing "], &["3", ""]],
        )
        .unwrap();
        let back = DatasetTable::from_csv_str(&table.to_csv_string().unwrap()).unwrap();
        assert_eq!(back, table);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.csv");
        table.write_csv(&path).unwrap();
        assert_eq!(DatasetTable::from_csv_file(&path).unwrap(), table);
    }

    #[test]
    fn test_quoted_comma_and_spaces_kept() {
        let csv = "id,note\n1,\"b,c\"\n2,\" padded \"\n";
        let table = DatasetTable::from_csv_str(csv).unwrap();
        assert_eq!(table.rows()[0], vec!["1", "b,c"]);
        assert_eq!(table.rows()[1][1], " padded ");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            DatasetTable::from_csv_file(dir.path().join("nope.csv")),
            Err(MedimgError::Io(_))
        ));
    }

    #[test]
    fn test_wrong_arity_reports_line() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        match DatasetTable::from_csv_str(csv) {
            Err(MedimgError::Csv { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected CSV error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_csv() {
        assert!(matches!(
            DatasetTable::from_csv_str("\n\n"),
            Err(MedimgError::Csv { .. })
        ));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = DatasetTable::from_rows(&["a", "a"], &[]);
        assert!(matches!(result, Err(MedimgError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_unique_values_first_appearance() {
        let table = DatasetTable::from_rows(
            &["subject", "label"],
            &[&["3", "0"], &["1", "1"], &["3", "1"], &["2", "0"], &["1", "0"]],
        )
        .unwrap();
        assert_eq!(table.unique_values("subject").unwrap(), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_require_column_missing() {
        let table = DatasetTable::from_rows(&["a"], &[&["1"]]).unwrap();
        match table.require_column("label") {
            Err(MedimgError::MissingColumn { column }) => assert_eq!(column, "label"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_select_rows_keeps_header() {
        let table =
            DatasetTable::from_rows(&["a", "b"], &[&["1", "x"], &["2", "y"], &["3", "x"]]).unwrap();
        let xs = table.select_rows(|r| r[1] == "x");
        assert_eq!(xs.columns(), table.columns());
        assert_eq!(xs.len(), 2);
        assert_eq!(xs.rows()[1][0], "3");
    }
}
