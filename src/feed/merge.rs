use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{DateGroup, HerbGroup, LogEntry, LogRow};

/// Merge a freshly fetched page into the rendered feed.
///
/// Pages are fixed-size slices of raw log rows, so a page can end in the middle
/// of a day. When the incoming page starts on the day the feed currently ends
/// on, the two halves of that day are joined herb by herb; every other day is
/// appended untouched.
pub fn merge_page(feed: &mut Vec<DateGroup>, incoming: Vec<DateGroup>) {
    let mut incoming = incoming.into_iter();
    let Some(first) = incoming.next() else { return };

    match feed.last_mut() {
        Some(last) if last.date == first.date => merge_day(last, first),
        _ => feed.push(first),
    }
    feed.extend(incoming);
}

fn merge_day(existing: &mut DateGroup, incoming: DateGroup) {
    for group in incoming.herbs {
        match existing.herbs.iter_mut().find(|h| h.name == group.name) {
            Some(found) => {
                found.entries.extend(group.entries);
                sort_newest_first(&mut found.entries);
            }
            None => existing.herbs.push(group),
        }
    }
}

/// Stable: entries logged at the same instant keep their arrival order.
pub(crate) fn sort_newest_first(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
}

/// Group raw rows into days (newest first), then herbs in order of their most
/// recent entry, each herb's entries newest first.
pub fn group_entries(rows: &[LogRow]) -> Vec<DateGroup> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&LogRow>> = BTreeMap::new();
    for row in rows {
        by_day.entry(row.logged_at.date()).or_default().push(row);
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, mut day_rows)| {
            day_rows.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
            let mut herbs: Vec<HerbGroup> = Vec::new();
            for row in day_rows {
                match herbs.iter_mut().find(|h| h.name == row.name) {
                    Some(h) => h.entries.push(row.to_entry()),
                    None => herbs.push(HerbGroup { name: row.name.clone(), entries: vec![row.to_entry()] }),
                }
            }
            DateGroup { date, herbs }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn entry(ts: &str, before: i64, after: i64) -> LogEntry {
        LogEntry { before_amount: before, after_amount: after, logged_at: at(ts), amount_increased: after > before }
    }

    fn day(date: &str, herbs: Vec<(&str, Vec<LogEntry>)>) -> DateGroup {
        DateGroup {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            herbs: herbs.into_iter().map(|(n, e)| HerbGroup { name: n.to_string(), entries: e }).collect(),
        }
    }

    fn row(ts: &str, name: &str, before: i64, after: i64) -> LogRow {
        LogRow { logged_at: at(ts), name: name.to_string(), before_amount: before, after_amount: after }
    }

    #[test]
    fn same_day_merge_resorts_herb_entries() {
        let mut feed = vec![day("2025-01-10", vec![(
            "Ginseng",
            vec![entry("2025-01-10 09:00", 10, 12), entry("2025-01-10 08:00", 8, 10)],
        )])];
        let incoming = vec![day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:30", 12, 15)])])];

        merge_page(&mut feed, incoming);

        assert_eq!(feed.len(), 1);
        let ginseng = feed[0].herb("Ginseng").unwrap();
        let times: Vec<String> = ginseng.entries.iter().map(|e| e.logged_at.format("%H:%M").to_string()).collect();
        assert_eq!(times, vec!["09:30", "09:00", "08:00"]);
        assert_eq!(ginseng.entries[0].before_amount, 12);
        assert_eq!(ginseng.entries[0].after_amount, 15);
    }

    #[test]
    fn next_day_is_appended_not_merged() {
        let mut feed = vec![day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:00", 1, 2)])])];
        let incoming = vec![day("2025-01-11", vec![("Ginseng", vec![entry("2025-01-11 09:00", 2, 3)])])];

        merge_page(&mut feed, incoming);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[1].date, NaiveDate::from_ymd_opt(2025, 1, 11).unwrap());
        assert_eq!(feed[0].entry_count(), 1);
    }

    #[test]
    fn empty_page_leaves_feed_unchanged() {
        let mut feed = vec![day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:00", 1, 2)])])];
        let before = feed.clone();
        merge_page(&mut feed, Vec::new());
        assert_eq!(feed, before);

        let mut empty: Vec<DateGroup> = Vec::new();
        merge_page(&mut empty, Vec::new());
        assert!(empty.is_empty());
    }

    #[test]
    fn empty_feed_takes_page_as_is() {
        let mut feed = Vec::new();
        let page = vec![
            day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:00", 1, 2)])]),
            day("2025-01-09", vec![("Licorice", vec![entry("2025-01-09 17:00", 5, 3)])]),
        ];
        merge_page(&mut feed, page.clone());
        assert_eq!(feed, page);
    }

    #[test]
    fn unknown_herb_on_shared_day_is_added_once() {
        let mut feed = vec![day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:00", 1, 2)])])];
        let incoming = vec![
            day("2025-01-10", vec![
                ("Licorice", vec![entry("2025-01-10 07:00", 4, 2)]),
                ("Ginseng", vec![entry("2025-01-10 06:00", 0, 1)]),
            ]),
            day("2025-01-09", vec![("Ginseng", vec![entry("2025-01-09 10:00", 0, 0)])]),
        ];

        merge_page(&mut feed, incoming);

        assert_eq!(feed.len(), 2);
        let names: Vec<&str> = feed[0].herbs.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Ginseng", "Licorice"]);
        assert_eq!(feed[0].herb("Ginseng").unwrap().entries.len(), 2);
        assert_eq!(feed[1].herbs.len(), 1);
    }

    #[test]
    fn equal_timestamps_keep_arrival_order() {
        let mut feed = vec![day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:00", 1, 2)])])];
        let incoming = vec![day("2025-01-10", vec![("Ginseng", vec![entry("2025-01-10 09:00", 7, 9)])])];

        merge_page(&mut feed, incoming);

        let entries = &feed[0].herbs[0].entries;
        assert_eq!(entries[0].before_amount, 1);
        assert_eq!(entries[1].before_amount, 7);
    }

    #[test]
    fn group_entries_orders_days_herbs_and_rows() {
        let rows = vec![
            row("2025-01-09 10:00", "Licorice", 3, 1),
            row("2025-01-10 08:00", "Ginseng", 8, 10),
            row("2025-01-10 09:00", "Ginseng", 10, 12),
            row("2025-01-10 08:30", "Licorice", 1, 4),
        ];
        let groups = group_entries(&rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        let names: Vec<&str> = groups[0].herbs.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Ginseng", "Licorice"]);
        assert_eq!(groups[0].herbs[0].entries[0].logged_at, at("2025-01-10 09:00"));
        assert!(!groups[1].herbs[0].entries[0].amount_increased);
        assert!(group_entries(&[]).is_empty());
    }

    #[test]
    fn paged_merge_matches_single_grouping() {
        // newest first, the way the server slices raw rows into pages
        let rows = vec![
            row("2025-01-12 11:00", "Ginseng", 20, 18),
            row("2025-01-12 10:00", "Licorice", 5, 9),
            row("2025-01-11 16:00", "Ginseng", 15, 20),
            row("2025-01-11 15:00", "Angelica", 0, 30),
            row("2025-01-11 12:00", "Ginseng", 12, 15),
            row("2025-01-11 09:00", "Licorice", 7, 5),
            row("2025-01-11 08:00", "Ginseng", 10, 12),
            row("2025-01-10 18:00", "Angelica", 3, 0),
            row("2025-01-10 07:00", "Ginseng", 11, 10),
        ];
        let expected = group_entries(&rows);

        for page_size in 1..=rows.len() {
            let mut feed = Vec::new();
            for page in rows.chunks(page_size) {
                merge_page(&mut feed, group_entries(page));
            }
            assert_eq!(feed, expected, "page size {page_size}");
        }
    }
}
