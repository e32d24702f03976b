use serde::Serialize;

use crate::feed::types::LogEntry;

use super::range::DateRange;

/// Received/delivered totals of one herb over the queried range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HerbTotals {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    pub total_stored: i64,
    pub total_delivered: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<LogEntry>,
}

impl HerbTotals {
    pub fn is_zero(&self) -> bool {
        self.total_stored == 0 && self.total_delivered == 0
    }
}

#[derive(Serialize)]
pub struct StatsReport {
    pub range: DateRange,
    pub total_stored: i64,
    pub total_delivered: i64,
    pub herbs: Vec<HerbTotals>,
}
