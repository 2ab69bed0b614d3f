//! Habitability filter command.
//!
//! Streams a KOI table through a [`RecordFilter`] and optionally writes the
//! matched rows back out as delimited text.
//!
//! # Memory Complexity
//!
//! O(m) where m = number of matching rows. Rejected rows are dropped as
//! soon as they are evaluated.

use crate::config::{HabitabilityConfig, TableOptions, DEFAULT_NAME_COLUMN};
use crate::filter::{FilterReport, RecordFilter};
use crate::predicate::{HabitabilityPredicate, Predicate};
use crate::record::Header;
use crate::streaming::{RecordWriter, DEFAULT_OUTPUT_BUFFER, LOW_MEMORY_OUTPUT_BUFFER};
use crate::table::{Result, TableError, TableReader};
use log::{info, warn};
use std::io::{Read, Write};
use std::path::Path;

/// Filter command configuration.
#[derive(Debug, Clone)]
pub struct FilterCommand {
    /// Thresholds applied to each record
    pub config: HabitabilityConfig,
    /// How the source is parsed
    pub options: TableOptions,
    /// Column reported for each match
    pub projection: String,
    /// Write matched rows to the output
    pub write_matches: bool,
    /// Use small output buffers
    pub low_memory: bool,
}

impl Default for FilterCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterCommand {
    pub fn new() -> Self {
        Self {
            config: HabitabilityConfig::default(),
            options: TableOptions::default(),
            projection: DEFAULT_NAME_COLUMN.to_string(),
            write_matches: false,
            low_memory: false,
        }
    }

    /// Set the predicate thresholds.
    pub fn with_config(mut self, config: HabitabilityConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the source parsing options.
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the column reported for each match.
    pub fn with_projection(mut self, column: impl Into<String>) -> Self {
        self.projection = column.into();
        self
    }

    /// Write matched rows (header first) to the output.
    pub fn with_write_matches(mut self, write: bool) -> Self {
        self.write_matches = write;
        self
    }

    pub fn with_low_memory(mut self, low_memory: bool) -> Self {
        self.low_memory = low_memory;
        self.options = self.options.with_low_memory(low_memory);
        self
    }

    /// Filter a table file.
    pub fn run<P: AsRef<Path>, W: Write>(
        &self,
        input_path: P,
        output: &mut W,
    ) -> Result<FilterReport> {
        info!("reading {}", input_path.as_ref().display());
        let reader = TableReader::from_path(input_path, &self.options)?;
        self.run_streaming(reader, output)
    }

    /// Validate the thresholds and make sure `header` carries every column
    /// they read. An empty header passes.
    pub fn check_header(&self, header: &Header) -> Result<()> {
        self.config.validate()?;
        if header.is_empty() {
            return Ok(());
        }
        let predicate = HabitabilityPredicate::new(self.config.clone());
        for column in predicate.required_columns() {
            if !header.contains(column) {
                return Err(TableError::MissingColumn(column.to_string()));
            }
        }
        Ok(())
    }

    /// Core streaming filter.
    ///
    /// Fails before reading any row if the header lacks a column the
    /// thresholds need. A source with no header at all yields no matches.
    pub fn run_streaming<R: Read, W: Write>(
        &self,
        reader: TableReader<R>,
        output: &mut W,
    ) -> Result<FilterReport> {
        let header = reader.shared_header();
        self.check_header(&header)?;
        if !header.is_empty() && !header.contains(&self.projection) {
            warn!(
                "column '{}' not found, matches will be reported without names",
                self.projection
            );
        }
        let predicate = HabitabilityPredicate::new(self.config.clone());

        let report =
            RecordFilter::new(predicate, self.projection.as_str()).run(reader.records())?;
        info!("{}", report.stats());

        // A headerless source has nothing to write, not even an empty header
        if self.write_matches && !header.is_empty() {
            let capacity = if self.low_memory {
                LOW_MEMORY_OUTPUT_BUFFER
            } else {
                DEFAULT_OUTPUT_BUFFER
            };
            let mut writer =
                RecordWriter::with_capacity(capacity, self.options.delimiter, &mut *output);
            writer.write_all(&header, report.records())?;
            writer.flush()?;
        }

        Ok(report)
    }
}
