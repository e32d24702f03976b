use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("start date {from} must not be after end date {to}")]
pub struct InvertedRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Inclusive day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, InvertedRange> {
        if from > to {
            return Err(InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

    #[test]
    fn rejects_inverted_range() {
        let err = DateRange::new(d("2025-02-01"), d("2025-01-01")).unwrap_err();
        assert_eq!(err.to_string(), "start date 2025-02-01 must not be after end date 2025-01-01");
    }

    #[test]
    fn single_day_range_is_inclusive() {
        let r = DateRange::new(d("2025-01-10"), d("2025-01-10")).unwrap();
        assert!(r.contains(d("2025-01-10")));
        assert!(!r.contains(d("2025-01-11")));
        assert!(!r.contains(d("2025-01-09")));
    }
}
