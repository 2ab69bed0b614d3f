//! Streaming record filter.
//!
//! Records are pushed through [`RecordFilter::consume`] one at a time.
//! Matching records are kept in arrival order; everything else is dropped
//! as soon as it has been evaluated. [`RecordFilter::finalize`] ends the
//! stream and summarizes the matches.
//!
//! # Errors
//!
//! Row-level problems (a cell that should be numeric but is not, a row the
//! reader could not decode) are logged at `warn` level, counted and
//! skipped. Fatal errors from the source stop [`RecordFilter::run`]
//! immediately.

use crate::predicate::Predicate;
use crate::record::Record;
use crate::table::{Result, TableError};
use log::{debug, warn};
use std::fmt;

/// What happened to a consumed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumed {
    /// Appended to the matches
    Matched,
    /// Evaluated false and dropped
    Rejected,
    /// Failed validation and skipped
    Malformed,
}

/// Accumulates the records that satisfy a predicate.
pub struct RecordFilter<P: Predicate> {
    predicate: P,
    projection: String,
    matches: Vec<Record>,
    stats: FilterStats,
}

impl<P: Predicate> RecordFilter<P> {
    /// Create a filter that projects `projection` from each match on finalize.
    pub fn new(predicate: P, projection: impl Into<String>) -> Self {
        Self {
            predicate,
            projection: projection.into(),
            matches: Vec::new(),
            stats: FilterStats::default(),
        }
    }

    #[inline]
    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    /// Evaluate the predicate without touching the accumulator.
    #[inline]
    pub fn evaluate(&self, record: &Record) -> bool {
        self.predicate.evaluate(record)
    }

    /// Push one record through the filter.
    pub fn consume(&mut self, record: Record) -> Consumed {
        self.stats.rows_read += 1;

        if let Err(e) = self.predicate.validate(&record) {
            self.skip(&TableError::field(record.line(), e));
            return Consumed::Malformed;
        }

        if self.predicate.evaluate(&record) {
            debug!("line {}: matched", record.line());
            self.stats.matched += 1;
            self.matches.push(record);
            Consumed::Matched
        } else {
            self.stats.rejected += 1;
            Consumed::Rejected
        }
    }

    /// Record a row the source could not turn into a record.
    pub fn skip(&mut self, err: &TableError) {
        warn!("skipping row: {}", err);
        self.stats.malformed += 1;
    }

    /// Matches accumulated so far.
    #[inline]
    pub fn matches(&self) -> &[Record] {
        &self.matches
    }

    #[inline]
    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    /// Drain a record stream through the filter and finalize it.
    ///
    /// Row-level errors are skipped; the first fatal error is returned.
    pub fn run<I>(mut self, records: I) -> Result<FilterReport>
    where
        I: IntoIterator<Item = Result<Record>>,
    {
        for result in records {
            match result {
                Ok(record) => {
                    self.consume(record);
                }
                Err(e) if !e.is_fatal() => {
                    self.stats.rows_read += 1;
                    self.skip(&e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(self.finalize())
    }

    /// End the stream and summarize the matches.
    pub fn finalize(self) -> FilterReport {
        let projected = self
            .matches
            .iter()
            .map(|r| r.get(&self.projection).unwrap_or_default().to_string())
            .collect();
        FilterReport {
            records: self.matches,
            projection: self.projection,
            projected,
            stats: self.stats,
        }
    }
}

/// Result of a finished filter run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterReport {
    records: Vec<Record>,
    projection: String,
    projected: Vec<String>,
    stats: FilterStats,
}

impl FilterReport {
    /// Number of matched records.
    #[inline]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Matched records in arrival order.
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Take ownership of the matched records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Name of the projected column.
    #[inline]
    pub fn projection(&self) -> &str {
        &self.projection
    }

    /// The projected column's value from each match, in match order.
    /// Absent values project as empty strings.
    #[inline]
    pub fn projected(&self) -> &[String] {
        &self.projected
    }

    #[inline]
    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found {} habitable planets: {}",
            self.count(),
            self.projected.join(", ")
        )
    }
}

/// Counters from a filter run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    /// Records handed to the filter, plus rows that failed to decode
    pub rows_read: usize,
    /// Records that matched
    pub matched: usize,
    /// Records that did not match
    pub rejected: usize,
    /// Rows skipped as malformed
    pub malformed: usize,
}

impl FilterStats {
    /// Percentage of well-formed records that matched.
    pub fn match_rate(&self) -> f64 {
        let evaluated = self.matched + self.rejected;
        if evaluated == 0 {
            0.0
        } else {
            100.0 * self.matched as f64 / evaluated as f64
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Read: {}, Matched: {}, Rejected: {}, Malformed: {}, Match rate: {:.2}%",
            self.rows_read,
            self.matched,
            self.rejected,
            self.malformed,
            self.match_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::HabitabilityPredicate;
    use crate::table::TableReader;

    const HEADER: &str = "kepler_name,koi_disposition,koi_insol,koi_prad\n";

    fn run_filter(rows: &str) -> FilterReport {
        let content = format!("{}{}", HEADER, rows);
        let reader = TableReader::new(content.as_bytes()).unwrap();
        RecordFilter::new(HabitabilityPredicate::default(), "kepler_name")
            .run(reader.records())
            .unwrap()
    }

    #[test]
    fn test_zero_rows() {
        let report = run_filter("");
        assert_eq!(report.count(), 0);
        assert!(report.projected().is_empty());
        assert_eq!(report.stats().rows_read, 0);
    }

    #[test]
    fn test_single_habitable_row() {
        let report = run_filter("Kepler-A b,CONFIRMED,0.5,1.0\n");
        assert_eq!(report.count(), 1);
        assert_eq!(report.projected(), ["Kepler-A b"]);
    }

    #[test]
    fn test_into_records_keeps_arrival_order() {
        let report = run_filter(
            "B,CONFIRMED,0.9,1.2\n\
             X,CANDIDATE,0.5,1.0\n\
             A,CONFIRMED,0.5,1.0\n",
        );
        let records = report.into_records();
        let names: Vec<_> = records.iter().map(|r| r.get("kepler_name")).collect();
        assert_eq!(names, [Some("B"), Some("A")]);
        assert!(records[0].line() < records[1].line());
    }

    #[test]
    fn test_single_row_wrong_disposition() {
        let report = run_filter("Kepler-A b,CANDIDATE,0.5,1.0\n");
        assert_eq!(report.count(), 0);
        assert_eq!(report.stats().rejected, 1);
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let report = run_filter(
            "A,CONFIRMED,0.5,1.0\n\
             B,CONFIRMED,lots,1.0\n\
             C,CONFIRMED,0.9,1.2\n\
             D,CANDIDATE,0.9,1.2\n",
        );
        assert_eq!(report.projected(), ["A", "C"]);
        assert_eq!(report.stats().malformed, 1);
        assert_eq!(report.stats().rejected, 1);
        assert_eq!(report.stats().rows_read, 4);
    }

    #[test]
    fn test_matches_keep_arrival_order() {
        let report = run_filter(
            "Z,CONFIRMED,1.0,1.0\n\
             X,CONFIRMED,0.5,0.9\n\
             Y,CONFIRMED,0.4,1.5\n",
        );
        assert_eq!(report.projected(), ["Z", "X", "Y"]);
        let lines: Vec<_> = report.records().iter().map(|r| r.line()).collect();
        assert!(lines.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_projection_is_empty() {
        let report = run_filter(",CONFIRMED,0.5,1.0\n");
        assert_eq!(report.projected(), [""]);
    }

    #[test]
    fn test_consume_outcomes() {
        let content = format!("{}A,CONFIRMED,0.5,1.0\nB,CONFIRMED,x,1.0\nC,,0.5,1.0\n", HEADER);
        let records: Vec<_> = TableReader::new(content.as_bytes())
            .unwrap()
            .records()
            .collect::<Result<_>>()
            .unwrap();

        let mut filter = RecordFilter::new(HabitabilityPredicate::default(), "kepler_name");
        let outcomes: Vec<_> = records.into_iter().map(|r| filter.consume(r)).collect();
        assert_eq!(
            outcomes,
            [Consumed::Matched, Consumed::Malformed, Consumed::Rejected]
        );
        assert_eq!(filter.matches().len(), 1);
    }

    #[test]
    fn test_accumulator_only_holds_matches() {
        let rows: String = (0..50)
            .map(|i| {
                let insol = i as f64 * 0.05;
                let disposition = if i % 3 == 0 { "CANDIDATE" } else { "CONFIRMED" };
                format!("P{},{},{},1.0\n", i, disposition, insol)
            })
            .collect();
        let report = run_filter(&rows);
        let predicate = HabitabilityPredicate::default();

        assert!(report.records().iter().all(|r| predicate.evaluate(r)));
        assert_eq!(report.count() + report.stats().rejected, 50);
    }

    #[test]
    fn test_idempotent_over_same_source() {
        let rows = "A,CONFIRMED,0.5,1.0\nB,CONFIRMED,2.0,1.0\nC,CONFIRMED,1.0,1.5\n";
        let first = run_filter(rows);
        let second = run_filter(rows);
        assert_eq!(first.count(), second.count());
        assert_eq!(first.projected(), second.projected());
    }

    #[test]
    fn test_fatal_error_stops_run() {
        let records = vec![
            Ok(Record::new(Default::default(), Vec::new(), 1)),
            Err(TableError::Io(std::io::Error::other("disk gone"))),
        ];
        let result = RecordFilter::new(|_: &Record| true, "name").run(records);
        assert!(matches!(result, Err(TableError::Io(_))));
    }

    #[test]
    fn test_row_error_is_counted() {
        let records = vec![
            Err(TableError::Parse {
                line: 2,
                message: "invalid utf-8".to_string(),
            }),
            Ok(Record::new(Default::default(), Vec::new(), 3)),
        ];
        let report = RecordFilter::new(|_: &Record| true, "name")
            .run(records)
            .unwrap();
        assert_eq!(report.count(), 1);
        assert_eq!(report.stats().malformed, 1);
        assert_eq!(report.stats().rows_read, 2);
    }

    #[test]
    fn test_report_display() {
        let report = run_filter("Kepler-1 b,CONFIRMED,0.5,1.0\nKepler-2 c,CONFIRMED,0.7,1.1\n");
        assert_eq!(
            report.to_string(),
            "found 2 habitable planets: Kepler-1 b, Kepler-2 c"
        );
    }

    #[test]
    fn test_stats_display() {
        let stats = FilterStats {
            rows_read: 4,
            matched: 1,
            rejected: 3,
            malformed: 0,
        };
        assert_eq!(
            stats.to_string(),
            "Read: 4, Matched: 1, Rejected: 3, Malformed: 0, Match rate: 25.00%"
        );
    }
}
