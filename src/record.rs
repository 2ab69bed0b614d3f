//! Core record types for delimited tabular data.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

/// A cell that should hold a number but does not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("column '{column}' is not numeric: '{value}'")]
pub struct FieldError {
    pub column: String,
    pub value: String,
}

/// Ordered column names of a table, with a name lookup index.
///
/// When a name repeats, lookups resolve to its last occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl Header {
    /// Build a header from column names in source order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = FxHashMap::default();
        for (i, name) in names.iter().enumerate() {
            index.insert(name.clone(), i);
        }
        Self { names, index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in source order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of a column by name.
    #[inline]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    #[inline]
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

/// One parsed row, keyed by the column names of its header.
///
/// Records are immutable once built. All records read from the same
/// source share one [`Header`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<String>,
    line: u64,
}

impl Record {
    /// Create a record from its header, cell values and 1-based source line.
    pub fn new(header: Arc<Header>, values: Vec<String>, line: u64) -> Self {
        Self {
            header,
            values,
            line,
        }
    }

    /// Raw cell for a column.
    ///
    /// Returns `None` if the column is unknown or the row is too short
    /// to contain it.
    #[inline]
    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.header.position(column)?;
        self.values.get(idx).map(String::as_str)
    }

    /// Cell coerced to a number.
    ///
    /// Absent and empty cells are `Ok(None)`; cells with text that is not a
    /// number are an error.
    pub fn number(&self, column: &str) -> Result<Option<f64>, FieldError> {
        match self.get(column) {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => s.trim().parse().map(Some).map_err(|_| FieldError {
                column: column.to_string(),
                value: s.to_string(),
            }),
        }
    }

    /// Source line the record was read from (1-based, 0 if unknown).
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Cell values in column order.
    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of cells present in the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}
