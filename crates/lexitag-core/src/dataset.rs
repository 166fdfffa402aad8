//! Tabular records in, annotated records out.
//!
//! A dataset is a header plus rows of optional cells aligned with it. The
//! CSV boundary lives here so callers never touch the `csv` crate directly.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::classify::Detection;
use crate::error::LexitagError;

/// One cell; `None` is a null or missing value.
pub type Cell = Option<String>;

/// An ordered collection of records sharing one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// A borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Record<'a> {
    /// Value of `column`, or `None` when the column is absent or the cell null.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.cells[idx].as_deref()
    }
}

impl Dataset {
    /// Build a dataset, rejecting duplicate headers and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, LexitagError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(LexitagError::MalformedInput(format!(
                    "duplicate column '{column}'"
                )));
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(LexitagError::MalformedInput(format!(
                "row {} has {} fields, expected {}",
                idx + 1,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Read a dataset from CSV with a header row. Empty fields become null.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, LexitagError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            return Err(LexitagError::MalformedInput("missing header row".into()));
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(malformed)?;
            rows.push(
                record
                    .iter()
                    .map(|field| (!field.is_empty()).then(|| field.to_string()))
                    .collect(),
            );
        }

        Self::new(columns, rows)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, LexitagError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn record(&self, idx: usize) -> Option<Record<'_>> {
        self.rows.get(idx).map(|cells| Record {
            columns: &self.columns,
            cells,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|cells| Record {
            columns: &self.columns,
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn malformed(e: csv::Error) -> LexitagError {
    LexitagError::MalformedInput(e.to_string())
}

/// Results of one dictionary over every record, in row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionColumn {
    pub dictionary: String,
    pub flags: Vec<u8>,
    /// Per-record matched terms; present only in detail mode.
    pub details: Option<Vec<Detection>>,
}

impl DetectionColumn {
    pub fn detected(&self) -> usize {
        self.flags.iter().filter(|&&f| f == 1).count()
    }

    fn headers(&self) -> Vec<String> {
        let mut headers = vec![format!("{}_detected", self.dictionary)];
        if self.details.is_some() {
            headers.push(format!("{}_count", self.dictionary));
            headers.push(format!("{}_matches", self.dictionary));
        }
        headers
    }

    fn push_fields(&self, row: usize, out: &mut Vec<String>) {
        out.push(self.flags[row].to_string());
        if let Some(details) = &self.details {
            out.push(details[row].count().to_string());
            out.push(details[row].matches().join(", "));
        }
    }
}

/// The source dataset, untouched, plus one detection column per dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDataset {
    source: Dataset,
    detections: Vec<DetectionColumn>,
}

impl AnnotatedDataset {
    pub(crate) fn new(source: Dataset, detections: Vec<DetectionColumn>) -> Self {
        Self { source, detections }
    }

    pub fn source(&self) -> &Dataset {
        &self.source
    }

    pub fn detections(&self) -> &[DetectionColumn] {
        &self.detections
    }

    pub fn detection(&self, dictionary: &str) -> Option<&DetectionColumn> {
        self.detections.iter().find(|d| d.dictionary == dictionary)
    }

    /// Detection flag for one row and dictionary.
    pub fn flag(&self, row: usize, dictionary: &str) -> Option<u8> {
        self.detection(dictionary)?.flags.get(row).copied()
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Original columns followed by the generated ones in dictionary order.
    pub fn header(&self) -> Vec<String> {
        let mut header = self.source.columns.clone();
        for detection in &self.detections {
            header.extend(detection.headers());
        }
        header
    }

    /// Write the header row and every record. Null cells become empty fields.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), LexitagError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.header())?;

        let mut fields = Vec::with_capacity(self.header().len());
        for (idx, row) in self.source.rows.iter().enumerate() {
            fields.clear();
            fields.extend(row.iter().map(|c| c.clone().unwrap_or_default()));
            for detection in &self.detections {
                detection.push_fields(idx, &mut fields);
            }
            wtr.write_record(&fields)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_path(&self, path: &Path) -> Result<(), LexitagError> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reads_csv_with_nulls() {
        let csv = "ID,Statement\n1,Hurry now\n2,\n";
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.columns(), cols(&["ID", "Statement"]));
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.record(0).unwrap().get("Statement"), Some("Hurry now"));
        assert_eq!(ds.record(1).unwrap().get("Statement"), None);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let csv = "ID,Statement\n1,ok\n2,too,many\n";
        assert!(matches!(
            Dataset::from_csv_reader(csv.as_bytes()),
            Err(LexitagError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let err = Dataset::new(cols(&["a", "a"]), vec![]).unwrap_err();
        assert!(matches!(err, LexitagError::MalformedInput(_)));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(
            Dataset::from_csv_reader("".as_bytes()),
            Err(LexitagError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_record_get_unknown_column() {
        let ds = Dataset::new(cols(&["a"]), vec![vec![Some("x".into())]]).unwrap();
        assert_eq!(ds.record(0).unwrap().get("b"), None);
        assert!(ds.record(5).is_none());
    }

    #[test]
    fn test_writes_header_and_appended_columns() {
        let ds = Dataset::new(
            cols(&["ID", "Statement"]),
            vec![
                vec![Some("1".into()), Some("Hurry, now".into())],
                vec![Some("2".into()), None],
            ],
        )
        .unwrap();
        let annotated = AnnotatedDataset::new(
            ds,
            vec![DetectionColumn {
                dictionary: "urgency_marketing".into(),
                flags: vec![1, 0],
                details: None,
            }],
        );

        let mut out = Vec::new();
        annotated.to_csv_writer(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "ID,Statement,urgency_marketing_detected\n1,\"Hurry, now\",1\n2,,0\n"
        );
    }

    #[test]
    fn test_detail_columns_in_header() {
        let ds = Dataset::new(cols(&["Statement"]), vec![vec![None]]).unwrap();
        let annotated = AnnotatedDataset::new(
            ds,
            vec![DetectionColumn {
                dictionary: "x".into(),
                flags: vec![0],
                details: Some(vec![Detection::default()]),
            }],
        );
        assert_eq!(
            annotated.header(),
            cols(&["Statement", "x_detected", "x_count", "x_matches"])
        );
    }

    #[test]
    fn test_csv_path_roundtrip_preserves_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "ID,Statement,Extra\n1,VIP only,keep me\n").unwrap();

        let ds = Dataset::from_csv_path(&input).unwrap();
        let annotated = AnnotatedDataset::new(
            ds.clone(),
            vec![DetectionColumn {
                dictionary: "exclusive_marketing".into(),
                flags: vec![1],
                details: None,
            }],
        );
        let output = dir.path().join("out.csv");
        annotated.to_csv_path(&output).unwrap();

        let reread = Dataset::from_csv_path(&output).unwrap();
        assert_eq!(reread.len(), 1);
        assert_eq!(reread.columns()[..3], ds.columns()[..]);
        assert_eq!(reread.rows()[0][..3], ds.rows()[0][..]);
        assert_eq!(reread.record(0).unwrap().get("exclusive_marketing_detected"), Some("1"));
    }
}
