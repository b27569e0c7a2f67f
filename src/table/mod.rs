// src/table/mod.rs

pub mod load;

pub use load::{load_table, TableFormat};

/// A tabular file as read from disk, before any column has a meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names in file order.
    pub headers: Vec<String>,
    /// One Vec per data row. Rows may be shorter than `headers`;
    /// missing and null cells read as "".
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (`row`, `col`), or "" when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Iterate one column's cells in row order.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        (0..self.rows.len()).map(move |r| self.cell(r, col))
    }

    /// Append a column. `values` must have one entry per row.
    pub fn with_column(mut self, name: String, values: Vec<String>) -> Self {
        debug_assert_eq!(values.len(), self.rows.len());
        let width = self.headers.len();
        self.headers.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.resize(width, String::new());
            row.push(value);
        }
        self
    }
}
