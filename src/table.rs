//! CSV loading into schema-agnostic tables.

use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::PipelineError;
use crate::schema::resolve_column;

/// A fully-read CSV file whose column semantics are not yet known.
/// Fields stay untyped until a stage resolves the columns it needs.
#[derive(Debug)]
pub struct RawTable {
    pub path: String,
    pub columns: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    /// Reads an entire CSV file into memory.
    ///
    /// I/O failures map to [`PipelineError::FileUnreadable`], parse failures
    /// to [`PipelineError::MalformedTable`].
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        let path_str = path.display().to_string();

        let classify = |source: csv::Error, path: &str| {
            if source.is_io_error() {
                PipelineError::FileUnreadable {
                    path: path.to_string(),
                    source,
                }
            } else {
                PipelineError::MalformedTable {
                    path: path.to_string(),
                    source,
                }
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| classify(e, &path_str))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| classify(e, &path_str))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(|e| classify(e, &path_str))?);
        }

        debug!(path = %path_str, columns = columns.len(), rows = rows.len(), "table read");

        Ok(RawTable {
            path: path_str,
            columns,
            rows,
        })
    }

    /// Resolves a semantic field to a column index, candidates in priority
    /// order.
    pub fn column_index(&self, candidates: &[&str]) -> Option<usize> {
        let name = resolve_column(&self.columns, candidates)?;
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the trimmed, non-empty value of a row at a column index.
    pub fn field<'a>(&self, row: &'a StringRecord, idx: usize) -> Option<&'a str> {
        row.get(idx).map(str::trim).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_table() {
        let path = write_temp(
            "railgap_table_read.csv",
            "STOP_ID, Boardings\nA01,120\nA02,80\n",
        );

        let table = RawTable::read(&path).unwrap();
        assert_eq!(table.columns, vec!["STOP_ID", "Boardings"]);
        assert_eq!(table.rows.len(), 2);

        let idx = table.column_index(&["stop_id"]).unwrap();
        assert_eq!(table.field(&table.rows[0], idx), Some("A01"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let err = RawTable::read(Path::new("/nonexistent/railgap.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::FileUnreadable { .. }));
    }

    #[test]
    fn test_empty_field_is_none() {
        let path = write_temp("railgap_table_empty.csv", "a,b\nx,\n");
        let table = RawTable::read(&path).unwrap();

        let idx = table.column_index(&["b"]).unwrap();
        assert_eq!(table.field(&table.rows[0], idx), None);

        fs::remove_file(&path).unwrap();
    }
}
