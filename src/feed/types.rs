use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::cursor::Cursor;

/// One recorded change of a herb's stock amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub before_amount: i64,
    pub after_amount: i64,
    pub logged_at: NaiveDateTime,
    pub amount_increased: bool,
}

/// Time-ordered entries (newest first) for one herb within one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerbGroup {
    pub name: String,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub herbs: Vec<HerbGroup>,
}

impl DateGroup {
    pub fn herb(&self, name: &str) -> Option<&HerbGroup> {
        self.herbs.iter().find(|h| h.name == name)
    }

    pub fn entry_count(&self) -> usize {
        self.herbs.iter().map(|h| h.entries.len()).sum()
    }
}

/// A raw log row as the server stores it, before grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub logged_at: NaiveDateTime,
    pub name: String,
    pub before_amount: i64,
    pub after_amount: i64,
}

impl LogRow {
    pub fn amount_increased(&self) -> bool {
        self.after_amount > self.before_amount
    }

    pub fn to_entry(&self) -> LogEntry {
        LogEntry {
            before_amount: self.before_amount,
            after_amount: self.after_amount,
            logged_at: self.logged_at,
            amount_increased: self.amount_increased(),
        }
    }
}

/// Initial feed handed to the controller by whoever rendered the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seed {
    pub cursor: Option<Cursor>,
    pub has_next_page: bool,
    pub entries: Vec<DateGroup>,
}

/// One decoded page of the log endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPage {
    pub data: Vec<DateGroup>,
    pub cursor: Option<Cursor>,
    pub has_next_page: bool,
}

impl From<LogPage> for Seed {
    fn from(page: LogPage) -> Self {
        Seed { cursor: page.cursor, has_next_page: page.has_next_page, entries: page.data }
    }
}

// Plan/result envelope types
#[derive(Serialize)]
pub struct FeedListing {
    pub pages: usize,
    pub has_next_page: bool,
    pub cursor: Option<String>,
    pub groups: Vec<DateGroup>,
}
