use serde::Serialize;

use super::types::{DateGroup, LogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn symbol(self) -> &'static str {
        match self {
            Direction::Increase => "▲",
            Direction::Decrease => "▼",
        }
    }
}

/// Display fields for one log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub time: String,
    pub before: i64,
    pub after: i64,
    pub delta: i64,
    pub direction: Direction,
}

impl RowView {
    pub fn signed_delta(&self) -> String {
        if self.delta > 0 { format!("+{}", self.delta) } else { self.delta.to_string() }
    }
}

// Direction comes from the server's flag, never from the sign of the delta.
pub fn render_row(entry: &LogEntry) -> RowView {
    RowView {
        time: entry.logged_at.format("%H:%M").to_string(),
        before: entry.before_amount,
        after: entry.after_amount,
        delta: entry.after_amount - entry.before_amount,
        direction: if entry.amount_increased { Direction::Increase } else { Direction::Decrease },
    }
}

pub fn render_line(entry: &LogEntry) -> String {
    let row = render_row(entry);
    format!("    {}  {} {} → {} ({})", row.time, row.direction.symbol(), row.before, row.after, row.signed_delta())
}

pub fn render_feed(groups: &[DateGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for day in groups {
        lines.push(format!("📅 {} ({} entries)", day.date.format("%Y-%m-%d"), day.entry_count()));
        for herb in &day.herbs {
            lines.push(format!("  🌿 {} ({})", herb.name, herb.entries.len()));
            lines.extend(herb.entries.iter().map(render_line));
        }
    }
    lines
}
