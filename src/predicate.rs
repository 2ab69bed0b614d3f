//! Record predicates.
//!
//! A [`Predicate`] decides whether a record is of interest. Evaluation is
//! pure: it never fails and never mutates the record. Cells that cannot be
//! compared (absent, empty, not a number) simply do not match.
//!
//! Malformed input is reported separately through [`Predicate::validate`],
//! so the filter can log and skip a broken row instead of silently
//! rejecting it.

use crate::config::HabitabilityConfig;
use crate::record::{FieldError, Record};

pub trait Predicate {
    /// Columns the source header must contain.
    fn required_columns(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Check that every cell the predicate reads can be coerced.
    fn validate(&self, _record: &Record) -> Result<(), FieldError> {
        Ok(())
    }

    /// Whether the record matches.
    fn evaluate(&self, record: &Record) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Record) -> bool,
{
    #[inline]
    fn evaluate(&self, record: &Record) -> bool {
        self(record)
    }
}

/// The habitability test for Kepler objects of interest.
///
/// A record matches when its disposition equals the target, its
/// insolation lies strictly inside the configured interval and its radius
/// is strictly below the configured bound.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitabilityPredicate {
    config: HabitabilityConfig,
}

impl Default for HabitabilityPredicate {
    fn default() -> Self {
        Self::new(HabitabilityConfig::default())
    }
}

impl HabitabilityPredicate {
    pub fn new(config: HabitabilityConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &HabitabilityConfig {
        &self.config
    }
}

impl Predicate for HabitabilityPredicate {
    fn required_columns(&self) -> Vec<&str> {
        self.config.columns().to_vec()
    }

    fn validate(&self, record: &Record) -> Result<(), FieldError> {
        record.number(&self.config.insolation_column)?;
        record.number(&self.config.radius_column)?;
        Ok(())
    }

    fn evaluate(&self, record: &Record) -> bool {
        let c = &self.config;
        let disposition = record.get(&c.disposition_column) == Some(c.disposition.as_str());
        let insolation = matches!(
            record.number(&c.insolation_column),
            Ok(Some(v)) if v > c.insolation_min && v < c.insolation_max
        );
        let radius = matches!(
            record.number(&c.radius_column),
            Ok(Some(v)) if v < c.radius_max
        );
        disposition && insolation && radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Header;
    use std::sync::Arc;

    fn planet(disposition: &str, insol: &str, prad: &str) -> Record {
        let header = Arc::new(Header::new([
            "kepler_name",
            "koi_disposition",
            "koi_insol",
            "koi_prad",
        ]));
        Record::new(
            header,
            vec![
                "Kepler-1 b".to_string(),
                disposition.to_string(),
                insol.to_string(),
                prad.to_string(),
            ],
            2,
        )
    }

    #[test]
    fn test_accepts_habitable() {
        let p = HabitabilityPredicate::default();
        assert!(p.evaluate(&planet("CONFIRMED", "0.5", "1.0")));
    }

    #[test]
    fn test_rejects_other_disposition() {
        let p = HabitabilityPredicate::default();
        assert!(!p.evaluate(&planet("CANDIDATE", "0.5", "1.0")));
        assert!(!p.evaluate(&planet("confirmed", "0.5", "1.0")));
    }

    #[test]
    fn test_insolation_bounds_are_exclusive() {
        let p = HabitabilityPredicate::default();
        assert!(!p.evaluate(&planet("CONFIRMED", "0.36", "1.0")));
        assert!(!p.evaluate(&planet("CONFIRMED", "1.11", "1.0")));
        assert!(p.evaluate(&planet("CONFIRMED", "0.3601", "1.0")));
        assert!(p.evaluate(&planet("CONFIRMED", "1.1099", "1.0")));
    }

    #[test]
    fn test_radius_bound_is_exclusive() {
        let p = HabitabilityPredicate::default();
        assert!(!p.evaluate(&planet("CONFIRMED", "0.5", "1.6")));
        assert!(p.evaluate(&planet("CONFIRMED", "0.5", "1.5999")));
    }

    #[test]
    fn test_missing_values_do_not_match() {
        let p = HabitabilityPredicate::default();
        assert!(!p.evaluate(&planet("CONFIRMED", "", "1.0")));
        assert!(!p.evaluate(&planet("CONFIRMED", "0.5", "")));
        assert!(!p.evaluate(&planet("CONFIRMED", "NaN", "1.0")));
    }

    #[test]
    fn test_validate_flags_non_numeric() {
        let p = HabitabilityPredicate::default();
        assert!(p.validate(&planet("CONFIRMED", "0.5", "1.0")).is_ok());
        assert!(p.validate(&planet("CONFIRMED", "", "")).is_ok());

        let err = p.validate(&planet("CONFIRMED", "bright", "1.0")).unwrap_err();
        assert_eq!(err.column, "koi_insol");
        // Evaluation stays total on malformed cells
        assert!(!p.evaluate(&planet("CONFIRMED", "bright", "1.0")));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = HabitabilityConfig::new()
            .with_disposition("CANDIDATE")
            .with_insolation_range(0.1, 5.0)
            .with_radius_max(3.0);
        let p = HabitabilityPredicate::new(config);
        assert!(p.evaluate(&planet("CANDIDATE", "4.0", "2.5")));
        assert!(!p.evaluate(&planet("CONFIRMED", "0.5", "1.0")));
    }

    #[test]
    fn test_closure_predicate() {
        let p = |r: &Record| r.get("koi_disposition") == Some("FALSE POSITIVE");
        assert!(p.evaluate(&planet("FALSE POSITIVE", "", "")));
        assert!(p.required_columns().is_empty());
    }
}
