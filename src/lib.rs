//! koi-filter: streaming habitability filter for Kepler KOI tables
//!
//! This library reads delimited tables incrementally, evaluates a
//! predicate on one record at a time and keeps only the records that
//! match, in arrival order.
//!
//! # Features
//!
//! - **Streaming I/O**: rejected rows are never retained
//! - **Comment-aware parsing**: archive preambles (`# ...`) are skipped
//! - **Explicit configuration**: thresholds are a value, not global state
//!
//! # Example
//!
//! ```rust,no_run
//! use koi_filter::{HabitabilityPredicate, RecordFilter, TableOptions, TableReader};
//!
//! let reader = TableReader::from_path("kepler_data.csv", &TableOptions::default()).unwrap();
//! let report = RecordFilter::new(HabitabilityPredicate::default(), "kepler_name")
//!     .run(reader.records())
//!     .unwrap();
//! println!("{}", report);
//! ```

pub mod commands;
pub mod config;
pub mod filter;
pub mod predicate;
pub mod record;
pub mod streaming;
pub mod table;

// Re-export commonly used types
pub use config::{HabitabilityConfig, TableOptions};
pub use filter::{Consumed, FilterReport, FilterStats, RecordFilter};
pub use predicate::{HabitabilityPredicate, Predicate};
pub use record::{FieldError, Header, Record};
pub use table::{parse_records, read_records, TableError, TableReader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{ColumnsCommand, FilterCommand};
    pub use crate::config::{HabitabilityConfig, TableOptions};
    pub use crate::filter::{FilterReport, RecordFilter};
    pub use crate::predicate::{HabitabilityPredicate, Predicate};
    pub use crate::record::Record;
    pub use crate::table::{TableError, TableReader};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_workflow() {
        use crate::filter::RecordFilter;
        use crate::predicate::HabitabilityPredicate;
        use crate::table::TableReader;

        let content = "\
# preamble
kepler_name,koi_disposition,koi_insol,koi_prad
Kepler-1649 c,CONFIRMED,0.75,1.06
Kepler-452 b,CONFIRMED,1.11,1.63
";
        let reader = TableReader::new(content.as_bytes()).unwrap();
        let report = RecordFilter::new(HabitabilityPredicate::default(), "kepler_name")
            .run(reader.records())
            .unwrap();

        assert_eq!(report.count(), 1);
        assert_eq!(report.projected(), ["Kepler-1649 c"]);
    }
}
