use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde_json::Value;

/// Opaque pagination token. Only a [`CursorStrategy`] creates one, so a cursor
/// held by the controller is always valid for the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("invalid {strategy} cursor: {value:?}")]
    Invalid { strategy: &'static str, value: String },
    #[error("unexpected cursor value: {0}")]
    Unexpected(String),
}

/// How the log endpoint is paginated: which query parameter carries the cursor,
/// which response field returns the next one, and what a valid value looks like.
pub trait CursorStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;
    fn query_param(&self) -> &'static str;
    fn response_field(&self) -> &'static str;
    fn parse(&self, raw: &str) -> Result<Cursor, CursorError>;

    /// Decode the response's cursor field; `null` means there is no next cursor.
    fn decode(&self, value: &Value) -> Result<Option<Cursor>, CursorError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => self.parse(s).map(Some),
            Value::Number(n) => self.parse(&n.to_string()).map(Some),
            other => Err(CursorError::Unexpected(other.to_string())),
        }
    }
}

/// Exclusive day boundary: the next page holds rows logged strictly before it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DateCursor;

impl CursorStrategy for DateCursor {
    fn name(&self) -> &'static str { "date" }
    fn query_param(&self) -> &'static str { "before" }
    fn response_field(&self) -> &'static str { "nextDate" }

    fn parse(&self, raw: &str) -> Result<Cursor, CursorError> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| CursorError::Invalid { strategy: self.name(), value: raw.to_string() })?;
        Ok(Cursor(date.format("%Y-%m-%d").to_string()))
    }
}

/// 1-based page number.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageCursor;

impl CursorStrategy for PageCursor {
    fn name(&self) -> &'static str { "page" }
    fn query_param(&self) -> &'static str { "page" }
    fn response_field(&self) -> &'static str { "nextPage" }

    fn parse(&self, raw: &str) -> Result<Cursor, CursorError> {
        match raw.trim().parse::<u32>() {
            Ok(n) if n >= 1 => Ok(Cursor(n.to_string())),
            _ => Err(CursorError::Invalid { strategy: self.name(), value: raw.to_string() }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CursorMode {
    #[default]
    Date,
    Page,
}

impl CursorMode {
    pub fn strategy(self) -> Arc<dyn CursorStrategy> {
        match self {
            CursorMode::Date => Arc::new(DateCursor),
            CursorMode::Page => Arc::new(PageCursor),
        }
    }
}

impl FromStr for CursorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(CursorMode::Date),
            "page" => Ok(CursorMode::Page),
            other => Err(format!("unknown cursor mode: {other}")),
        }
    }
}
