use super::{DataSource, Table};
use crate::preprocessing::error::PreprocessingError;

/// A data source over a table already held in memory.
///
/// Useful for tests and for callers that fetch data themselves.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    table: Table,
}

impl InMemorySource {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl DataSource for InMemorySource {
    fn fetch(&self) -> Result<Table, PreprocessingError> {
        if self.table.n_rows() == 0 {
            return Err(PreprocessingError::DataFetch(
                "in-memory dataset is empty".to_string(),
            ));
        }
        Ok(self.table.clone())
    }
}
