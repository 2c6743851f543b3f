//! FILENAME: core/persistence/src/import.rs
//! PURPOSE: Files uploaded to replace a matrix, and parsing of their content.

use std::path::Path;

use engine::{parse_value, Matrix};

use crate::{MatrixData, PersistenceError};

/// A file selected by the user for import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        ImportFile {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "matrix.txt".to_string());
        Ok(ImportFile { name, bytes })
    }
}

/// Parses delimited numeric text (tab, semicolon or comma separated, one row per line).
/// The delimiter is detected from the first non-blank line. Fields may be quoted;
/// blank lines are skipped. Every value must be a finite number.
pub fn parse_delimited(bytes: &[u8]) -> Result<MatrixData, PersistenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(bytes))
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .iter()
            .map(|field| {
                parse_value(field).ok_or_else(|| {
                    PersistenceError::InvalidFormat(format!(
                        "line {}: invalid number '{}'",
                        line, field
                    ))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    let matrix = Matrix::from_rows(rows)?;
    Ok(MatrixData::from_matrix(&matrix))
}

fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first = bytes
        .split(|b| *b == b'\n')
        .find(|line| !line.iter().all(u8::is_ascii_whitespace))
        .unwrap_or_default();
    if first.contains(&b'\t') {
        b'\t'
    } else if first.contains(&b';') {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_tab_separated() {
        let data = parse_delimited(b"1\t2\t3\n4\t5\t6\n").unwrap();
        assert_eq!(data.data, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(data.columns, vec![0, 1, 2]);
        assert_eq!(data.index, vec![0, 1]);
    }

    #[test]
    fn test_parse_detects_delimiters() {
        let semicolon = parse_delimited(b"1.5;2\n3;4\n").unwrap();
        assert_eq!(semicolon.data[0], vec![1.5, 2.0]);

        let comma = parse_delimited(b"\n1,2\n\n3,4\n").unwrap();
        assert_eq!(comma.data, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_parse_reports_bad_number() {
        let err = parse_delimited(b"1\t2\n3\tx\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let data = parse_delimited(b"\"1\",\"2\"\n\"3\",\"4.5\"\n").unwrap();
        assert_eq!(data.data, vec![vec![1.0, 2.0], vec![3.0, 4.5]]);

        let padded = parse_delimited(b"1 ; 2\n 3;4 \n").unwrap();
        assert_eq!(padded.data, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        let err = parse_delimited(b"1,NaN\n").unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat(_)));
        assert!(parse_delimited(b"inf,2\n").is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        let err = parse_delimited(&[b'1', b',', 0xff, b'\n']).unwrap_err();
        assert!(matches!(err, PersistenceError::Csv(_)));
    }

    #[test]
    fn test_parse_rejects_ragged() {
        let err = parse_delimited(b"1\t2\n3\n").unwrap_err();
        assert!(matches!(err, PersistenceError::Shape(_)));
    }

    #[test]
    fn test_parse_empty_file() {
        let data = parse_delimited(b"").unwrap();
        assert!(data.data.is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\t2").unwrap();
        let import = ImportFile::from_path(file.path()).unwrap();
        assert_eq!(import.bytes, b"1\t2\n");
        assert!(!import.name.is_empty());
    }
}
