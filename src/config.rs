//! Run configuration for the habitability filter.
//!
//! Thresholds are fixed for the duration of a run: a
//! [`HabitabilityConfig`] is built once, validated, and handed to the
//! predicate by value.

use crate::table::{Result, TableError};

pub const DEFAULT_DISPOSITION_COLUMN: &str = "koi_disposition";
pub const DEFAULT_INSOLATION_COLUMN: &str = "koi_insol";
pub const DEFAULT_RADIUS_COLUMN: &str = "koi_prad";
pub const DEFAULT_NAME_COLUMN: &str = "kepler_name";

pub const DEFAULT_DISPOSITION: &str = "CONFIRMED";
/// Stellar flux bounds relative to Earth (exclusive).
pub const DEFAULT_INSOLATION_MIN: f64 = 0.36;
pub const DEFAULT_INSOLATION_MAX: f64 = 1.11;
/// Planet radius bound in Earth radii (exclusive).
pub const DEFAULT_RADIUS_MAX: f64 = 1.6;

/// Read buffer for a full archive export (~10k rows, a few MB).
pub const DEFAULT_INPUT_BUFFER: usize = 256 * 1024;
pub const LOW_MEMORY_INPUT_BUFFER: usize = 64 * 1024;

/// Thresholds and the columns they apply to.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitabilityConfig {
    /// Column holding the categorical disposition
    pub disposition_column: String,
    /// Disposition a record must have to match
    pub disposition: String,
    /// Column holding insolation flux
    pub insolation_column: String,
    /// Exclusive lower bound on insolation
    pub insolation_min: f64,
    /// Exclusive upper bound on insolation
    pub insolation_max: f64,
    /// Column holding planetary radius
    pub radius_column: String,
    /// Exclusive upper bound on radius
    pub radius_max: f64,
}

impl Default for HabitabilityConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitabilityConfig {
    pub fn new() -> Self {
        Self {
            disposition_column: DEFAULT_DISPOSITION_COLUMN.to_string(),
            disposition: DEFAULT_DISPOSITION.to_string(),
            insolation_column: DEFAULT_INSOLATION_COLUMN.to_string(),
            insolation_min: DEFAULT_INSOLATION_MIN,
            insolation_max: DEFAULT_INSOLATION_MAX,
            radius_column: DEFAULT_RADIUS_COLUMN.to_string(),
            radius_max: DEFAULT_RADIUS_MAX,
        }
    }

    /// Set the required disposition value.
    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = disposition.into();
        self
    }

    /// Set the open insolation interval.
    pub fn with_insolation_range(mut self, min: f64, max: f64) -> Self {
        self.insolation_min = min;
        self.insolation_max = max;
        self
    }

    /// Set the exclusive radius bound.
    pub fn with_radius_max(mut self, max: f64) -> Self {
        self.radius_max = max;
        self
    }

    /// Point the thresholds at different columns.
    pub fn with_columns(
        mut self,
        disposition: impl Into<String>,
        insolation: impl Into<String>,
        radius: impl Into<String>,
    ) -> Self {
        self.disposition_column = disposition.into();
        self.insolation_column = insolation.into();
        self.radius_column = radius.into();
        self
    }

    /// Reject thresholds that can never match anything.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("insolation minimum", self.insolation_min),
            ("insolation maximum", self.insolation_max),
            ("radius maximum", self.radius_max),
        ] {
            if !value.is_finite() {
                return Err(TableError::Config(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if self.insolation_min >= self.insolation_max {
            return Err(TableError::Config(format!(
                "empty insolation interval ({}, {})",
                self.insolation_min, self.insolation_max
            )));
        }
        Ok(())
    }

    /// Columns a record must expose for the thresholds to be evaluated.
    pub fn columns(&self) -> [&str; 3] {
        [
            &self.disposition_column,
            &self.insolation_column,
            &self.radius_column,
        ]
    }
}

/// How the delimited source is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Lines starting with this byte are skipped; `None` disables comments
    pub comment: Option<u8>,
    /// Input buffer capacity in bytes
    pub buffer_capacity: usize,
    /// Trim surrounding whitespace from headers and cells
    pub trim: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: Some(b'#'),
            buffer_capacity: DEFAULT_INPUT_BUFFER,
            trim: true,
        }
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Shrink buffers for memory-constrained runs.
    pub fn with_low_memory(mut self, low_memory: bool) -> Self {
        self.buffer_capacity = if low_memory {
            LOW_MEMORY_INPUT_BUFFER
        } else {
            DEFAULT_INPUT_BUFFER
        };
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .comment(self.comment)
            .buffer_capacity(self.buffer_capacity)
            .trim(if self.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            });
        builder
    }
}
