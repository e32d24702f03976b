use std::collections::BTreeMap;

use crate::feed::types::{DateGroup, LogEntry};
use crate::inventory::types::Herb;

use super::range::DateRange;
use super::types::HerbTotals;

#[derive(Default)]
struct Tally {
    stored: i64,
    delivered: i64,
    entries: Vec<LogEntry>,
}

/// Fold log entries within `range` into per-herb totals.
///
/// Every registered herb gets a row, even without activity. Herbs that only
/// appear in the log (deleted since) are kept too. Rows are sorted by name.
pub fn summarize(range: &DateRange, herbs: &[Herb], groups: &[DateGroup], details: bool) -> Vec<HerbTotals> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for herb in herbs {
        tallies.entry(herb.name.as_str()).or_default();
    }

    for day in groups.iter().filter(|d| range.contains(d.date)) {
        for group in &day.herbs {
            let tally = tallies.entry(group.name.as_str()).or_default();
            for e in &group.entries {
                if e.amount_increased {
                    tally.stored += e.after_amount - e.before_amount;
                } else {
                    tally.delivered += e.before_amount - e.after_amount;
                }
                if details {
                    tally.entries.push(e.clone());
                }
            }
        }
    }

    tallies
        .into_iter()
        .map(|(name, mut t)| {
            let herb = herbs.iter().find(|h| h.name == name);
            t.entries.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
            HerbTotals {
                name: name.to_string(),
                row_num: herb.map(|h| h.row_num),
                amount: herb.map(|h| h.amount),
                total_stored: t.stored,
                total_delivered: t.delivered,
                entries: t.entries,
            }
        })
        .collect()
}

pub fn hide_zero(rows: Vec<HerbTotals>) -> Vec<HerbTotals> {
    rows.into_iter().filter(|r| !r.is_zero()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::merge::group_entries;
    use crate::feed::types::LogRow;
    use chrono::{NaiveDate, NaiveDateTime};

    fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

    fn row(ts: &str, name: &str, before: i64, after: i64) -> LogRow {
        LogRow {
            logged_at: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            name: name.into(),
            before_amount: before,
            after_amount: after,
        }
    }

    fn herb(row_num: u32, name: &str, amount: i64) -> Herb {
        Herb { row_num, name: name.into(), amount, last_stored_date: None, memo: None }
    }

    fn january() -> DateRange { DateRange::new(d("2025-01-01"), d("2025-01-31")).unwrap() }

    #[test]
    fn splits_increases_and_decreases() {
        let groups = group_entries(&[
            row("2025-01-10 09:00", "Ginseng", 10, 15),
            row("2025-01-10 10:00", "Ginseng", 15, 12),
            row("2025-01-11 08:00", "Ginseng", 12, 20),
        ]);

        let rows = summarize(&january(), &[herb(2, "Ginseng", 20)], &groups, false);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_stored, 13);
        assert_eq!(rows[0].total_delivered, 3);
        assert_eq!(rows[0].row_num, Some(2));
        assert!(rows[0].entries.is_empty());
    }

    #[test]
    fn idle_and_log_only_herbs_are_listed_by_name() {
        let groups = group_entries(&[row("2025-01-05 12:00", "Angelica", 4, 1)]);

        let rows = summarize(&january(), &[herb(3, "Licorice", 7), herb(2, "Cinnamon", 0)], &groups, false);

        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Angelica", "Cinnamon", "Licorice"]);
        assert_eq!(rows[0].amount, None);
        assert_eq!(rows[0].total_delivered, 3);
        assert!(rows[1].is_zero());

        let active = hide_zero(rows);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Angelica");
    }

    #[test]
    fn ignores_days_outside_range_and_keeps_details_newest_first() {
        let groups = group_entries(&[
            row("2024-12-31 23:00", "Ginseng", 0, 100),
            row("2025-01-02 08:00", "Ginseng", 5, 6),
            row("2025-01-03 08:00", "Ginseng", 6, 9),
        ]);

        let rows = summarize(&january(), &[], &groups, true);

        assert_eq!(rows[0].total_stored, 4);
        let times: Vec<_> = rows[0].entries.iter().map(|e| e.logged_at.date()).collect();
        assert_eq!(times, [d("2025-01-03"), d("2025-01-02")]);
    }
}
