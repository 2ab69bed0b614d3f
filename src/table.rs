//! Streaming delimited-table reader.

use crate::config::TableOptions;
use crate::record::{FieldError, Header, Record};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while reading and filtering a table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TableError>;

impl TableError {
    /// Whether the error ends the stream.
    ///
    /// Parse errors are confined to one row; everything else aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TableError::Parse { .. })
    }

    /// Row-level error for a cell that failed numeric coercion.
    pub fn field(line: u64, err: FieldError) -> Self {
        TableError::Parse {
            line,
            message: err.to_string(),
        }
    }

    fn from_csv(err: csv::Error, fallback_line: u64) -> Self {
        let line = match err.kind() {
            csv::ErrorKind::Utf8 { pos: Some(pos), .. }
            | csv::ErrorKind::UnequalLengths { pos: Some(pos), .. } => pos.line(),
            _ => fallback_line,
        };
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => TableError::Io(e),
            _ => TableError::Parse { line, message },
        }
    }

    pub(crate) fn from_csv_write(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => TableError::Io(e),
            _ => TableError::InvalidFormat(message),
        }
    }
}

/// A streaming reader over delimited text with a header row.
///
/// Comment lines and blank lines are skipped before parsing. The first
/// remaining row names the columns; every later row becomes one [`Record`].
pub struct TableReader<R: Read> {
    reader: csv::Reader<R>,
    header: Arc<Header>,
    row: csv::StringRecord,
    line_number: u64,
}

impl TableReader<File> {
    /// Open a table file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::with_options(file, options)
    }
}

impl<R: Read> TableReader<R> {
    /// Create a reader with default options (comma-delimited, `#` comments).
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, &TableOptions::default())
    }

    /// Create a reader and consume the header row.
    ///
    /// A source with no rows at all yields an empty header and no records.
    pub fn with_options(reader: R, options: &TableOptions) -> Result<Self> {
        let mut reader = options.reader_builder().from_reader(reader);
        let header = match reader.headers() {
            Ok(names) => Header::new(names.iter()),
            Err(e) => {
                return Err(match TableError::from_csv(e, 1) {
                    TableError::Parse { line, message } => {
                        TableError::InvalidFormat(format!("header at line {}: {}", line, message))
                    }
                    other => other,
                })
            }
        };
        let line_number = reader.position().line().saturating_sub(1);

        Ok(Self {
            reader,
            header: Arc::new(header),
            row: csv::StringRecord::new(),
            line_number,
        })
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Shared handle to the header, as carried by every record.
    #[inline]
    pub fn shared_header(&self) -> Arc<Header> {
        Arc::clone(&self.header)
    }

    /// Line of the most recently read row.
    #[inline]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Read the next record.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        match self.reader.read_record(&mut self.row) {
            Ok(false) => Ok(None),
            Ok(true) => {
                self.line_number = self
                    .row
                    .position()
                    .map_or(self.line_number + 1, |p| p.line());
                let values = self.row.iter().map(str::to_string).collect();
                Ok(Some(Record::new(
                    Arc::clone(&self.header),
                    values,
                    self.line_number,
                )))
            }
            Err(e) => {
                let err = TableError::from_csv(e, self.line_number + 1);
                if let TableError::Parse { line, .. } = err {
                    self.line_number = line;
                }
                Err(err)
            }
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> TableRecordIter<R> {
        TableRecordIter {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over table records.
///
/// Row-level errors are yielded and iteration continues; a fatal error is
/// yielded once and ends the iteration.
pub struct TableRecordIter<R: Read> {
    reader: TableReader<R>,
    done: bool,
}

impl<R: Read> TableRecordIter<R> {
    #[inline]
    pub fn header(&self) -> &Header {
        self.reader.header()
    }
}

impl<R: Read> Iterator for TableRecordIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                if e.is_fatal() {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}

/// Read all records from a file, failing on the first error.
pub fn read_records<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<Vec<Record>> {
    let reader = TableReader::from_path(path, options)?;
    reader.records().collect()
}

/// Parse records from a string (useful for testing).
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    let reader = TableReader::new(content.as_bytes())?;
    reader.records().collect()
}
