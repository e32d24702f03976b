use chrono::{Duration, Local, NaiveDate};

// Parse a day string like "today", "7d" (seven days ago) or "YYYY-MM-DD".
// Returns None if unparseable.
pub fn parse_day_str(s: &str) -> Option<NaiveDate> {
    parse_day_relative_to(s, Local::now().date_naive())
}

fn parse_day_relative_to(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("today") {
        return Some(today);
    }
    // "7d" -> today - 7 days
    if let Some(stripped) = s.strip_suffix('d') {
        if let Ok(days) = stripped.parse::<i64>() {
            if days >= 0 {
                return Duration::try_days(days).and_then(|d| today.checked_sub_signed(d));
            }
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// Helper for Option<String> inputs used by CLI flags like --from/--to
pub fn parse_day_opt(s: &Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    let Some(s) = s.as_ref() else { return Ok(None) };
    match parse_day_str(s) {
        Some(d) => Ok(Some(d)),
        None => anyhow::bail!("Invalid date: {} (expected YYYY-MM-DD, Nd or today)", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

    #[test]
    fn parses_absolute_relative_and_today() {
        let today = d("2025-01-10");
        assert_eq!(parse_day_relative_to("2024-12-31", today), Some(d("2024-12-31")));
        assert_eq!(parse_day_relative_to("7d", today), Some(d("2025-01-03")));
        assert_eq!(parse_day_relative_to("0d", today), Some(today));
        assert_eq!(parse_day_relative_to(" Today ", today), Some(today));
        assert_eq!(parse_day_relative_to("-2d", today), None);
        assert_eq!(parse_day_relative_to("yesterday", today), None);
        // out of range for a duration or for the calendar
        assert_eq!(parse_day_relative_to("200000000000000d", today), None);
        assert_eq!(parse_day_relative_to("100000000d", today), None);
    }

    #[test]
    fn parse_day_opt_reports_bad_input() {
        assert_eq!(parse_day_opt(&None).unwrap(), None);
        assert_eq!(parse_day_opt(&Some("2025-02-01".into())).unwrap(), Some(d("2025-02-01")));
        assert!(parse_day_opt(&Some("02/01/2025".into())).is_err());
    }
}
