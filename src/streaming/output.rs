//! Delimited output for matched records.

use crate::record::{Header, Record};
use crate::table::{Result, TableError};
use std::io::Write;

/// Write buffer sizes for matched rows.
pub const DEFAULT_OUTPUT_BUFFER: usize = 256 * 1024;
pub const LOW_MEMORY_OUTPUT_BUFFER: usize = 32 * 1024;

/// Buffered writer that emits records as delimited text.
///
/// Cells are quoted only when they contain the delimiter, a quote or a
/// line break. Short rows are written as-is.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    /// Create a comma-delimited writer with the default buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, b',', output)
    }

    /// Create a writer with the given buffer size and delimiter.
    pub fn with_capacity(capacity: usize, delimiter: u8, output: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .delimiter(delimiter)
            .buffer_capacity(capacity)
            .from_writer(output);
        Self { writer }
    }

    /// Write the header row.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.writer
            .write_record(header.names())
            .map_err(TableError::from_csv_write)
    }

    /// Write one record.
    #[inline]
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.writer
            .write_record(record.values())
            .map_err(TableError::from_csv_write)
    }

    /// Write a header followed by every record.
    pub fn write_all(&mut self, header: &Header, records: &[Record]) -> Result<usize> {
        self.write_header(header)?;
        for record in records {
            self.write_record(record)?;
        }
        Ok(records.len())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
