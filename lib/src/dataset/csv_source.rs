//! CSV-backed data source.

use super::{DataSource, Table, Value};
use crate::preprocessing::error::PreprocessingError;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Read a headed CSV stream into a [`Table`].
///
/// Each cell is typed independently via [`Value::parse`]. Any reader or
/// shape failure is reported as [`PreprocessingError::DataFetch`].
pub fn read_csv<R: Read>(reader: R) -> Result<Table, PreprocessingError> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

    let names: Vec<String> = rdr
        .headers()
        .map_err(|e| PreprocessingError::DataFetch(format!("failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(Value::parse).collect());
    }

    if names.is_empty() {
        return Err(PreprocessingError::DataFetch("CSV has no columns".to_string()));
    }

    Table::from_rows(names, rows).map_err(|e| PreprocessingError::DataFetch(e.to_string()))
}

/// Loads the dataset from a CSV file on disk.
#[derive(Clone, Debug)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvFileSource {
    fn fetch(&self) -> Result<Table, PreprocessingError> {
        let file = File::open(&self.path).map_err(|e| {
            PreprocessingError::DataFetch(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        let table = read_csv(BufReader::new(file))?;
        tracing::info!(
            path = %self.path.display(),
            rows = table.n_rows(),
            columns = table.n_cols(),
            "loaded CSV dataset"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv_types_cells() {
        let data = "Type,Age,Fee,Adopted\nDog,2,100.5,yes\nCat,3,0,no\n";
        let table = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column_names(), vec!["Type", "Age", "Fee", "Adopted"]);
        assert_eq!(table.column("Age").unwrap().values()[0], Value::Int(2));
        assert_eq!(table.column("Fee").unwrap().values()[0], Value::Float(100.5));
        assert_eq!(table.column("Type").unwrap().values()[1], Value::from("Cat"));
    }

    #[test]
    fn test_read_csv_ragged_is_fetch_error() {
        let data = "a,b\n1,2\n3\n";
        let result = read_csv(data.as_bytes());
        assert!(matches!(result, Err(PreprocessingError::DataFetch(_))));
    }

    #[test]
    fn test_file_source_missing_file() {
        let source = CsvFileSource::new("/definitely/not/here.csv");
        assert!(matches!(
            source.fetch(),
            Err(PreprocessingError::DataFetch(_))
        ));
    }

    #[test]
    fn test_file_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Type,Age").unwrap();
        writeln!(file, "Dog,1").unwrap();
        file.flush().unwrap();

        let table = CsvFileSource::new(file.path()).fetch().unwrap();
        assert_eq!(table.n_rows(), 1);
    }
}
