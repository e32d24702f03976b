use chrono::NaiveDate;

use super::types::{Herb, HerbRegister, HerbUpdate};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChangeSetError {
    #[error("no herb at row {0}")]
    UnknownRow(u32),
    #[error("herb name must not be empty")]
    EmptyName,
    #[error("herb {0:?} is already registered")]
    Duplicate(String),
    #[error("amount must not be negative (got {0})")]
    NegativeAmount(i64),
}

/// One editable herb: the row as loaded plus the values edited so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HerbRow {
    original: Herb,
    amount: i64,
    last_stored_date: Option<NaiveDate>,
    memo: Option<String>,
}

impl HerbRow {
    pub fn new(mut herb: Herb) -> Self {
        herb.memo = normalize_memo(herb.memo.as_deref());
        Self {
            amount: herb.amount,
            last_stored_date: herb.last_stored_date,
            memo: herb.memo.clone(),
            original: herb,
        }
    }

    pub fn amount(&self) -> i64 { self.amount }

    /// Amounts are clamped at zero.
    pub fn set_amount(&mut self, amount: i64) {
        self.amount = amount.max(0);
    }

    pub fn adjust_amount(&mut self, delta: i64) {
        self.set_amount(self.amount.saturating_add(delta));
    }

    pub fn set_last_stored_date(&mut self, date: Option<NaiveDate>) {
        self.last_stored_date = date;
    }

    // blank memo clears it
    pub fn set_memo(&mut self, memo: &str) {
        self.memo = normalize_memo(Some(memo));
    }

    pub fn is_dirty(&self) -> bool {
        self.to_update().is_changed()
    }

    pub fn to_update(&self) -> HerbUpdate {
        HerbUpdate {
            row_num: self.original.row_num,
            name: self.original.name.clone(),
            original_amount: self.original.amount,
            new_amount: self.amount,
            original_last_stored_date: self.original.last_stored_date,
            new_last_stored_date: self.last_stored_date,
            original_memo: self.original.memo.clone(),
            new_memo: self.memo.clone(),
        }
    }
}

/// Pending edits over the loaded inventory, ordered by row number.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    rows: Vec<HerbRow>,
}

impl ChangeSet {
    pub fn from_herbs(herbs: Vec<Herb>) -> Self {
        let mut rows: Vec<HerbRow> = herbs.into_iter().map(HerbRow::new).collect();
        rows.sort_by_key(|r| r.original.row_num);
        Self { rows }
    }

    pub fn row_mut(&mut self, row_num: u32) -> Result<&mut HerbRow, ChangeSetError> {
        self.rows
            .iter_mut()
            .find(|r| r.original.row_num == row_num)
            .ok_or(ChangeSetError::UnknownRow(row_num))
    }

    /// One update per dirty row. Empty means there is nothing to send.
    pub fn pending(&self) -> Vec<HerbUpdate> {
        self.rows.iter().filter(|r| r.is_dirty()).map(HerbRow::to_update).collect()
    }
}

// Blank and whitespace-only memos mean no memo, on both sides of a comparison.
fn normalize_memo(memo: Option<&str>) -> Option<String> {
    memo.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string)
}

/// Client-side pre-check; the server still has the final word. Returns the
/// registration with its name trimmed.
pub fn validate_registration<'a, I>(mut reg: HerbRegister, existing: I) -> Result<HerbRegister, ChangeSetError>
where
    I: IntoIterator<Item = &'a str>,
{
    let name = reg.name.trim();
    if name.is_empty() {
        return Err(ChangeSetError::EmptyName);
    }
    if existing.into_iter().any(|n| n.trim() == name) {
        return Err(ChangeSetError::Duplicate(name.to_string()));
    }
    if reg.amount < 0 {
        return Err(ChangeSetError::NegativeAmount(reg.amount));
    }
    reg.name = name.to_string();
    reg.memo = normalize_memo(reg.memo.as_deref());
    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

    fn herbs() -> Vec<Herb> {
        vec![
            Herb { row_num: 3, name: "Licorice".into(), amount: 4, last_stored_date: None, memo: Some("shelf B".into()) },
            Herb { row_num: 2, name: "Ginseng".into(), amount: 12, last_stored_date: Some(d("2025-01-02")), memo: None },
        ]
    }

    fn register(name: &str, amount: i64) -> HerbRegister {
        HerbRegister { name: name.into(), amount, last_stored_date: d("2025-01-10"), memo: Some("  ".into()) }
    }

    #[test]
    fn untouched_set_has_nothing_pending() {
        let mut set = ChangeSet::from_herbs(herbs());
        assert!(set.pending().is_empty());

        // edit and revert
        let row = set.row_mut(2).unwrap();
        row.adjust_amount(5);
        row.adjust_amount(-5);
        assert!(!row.is_dirty());
        assert!(set.pending().is_empty());
    }

    #[test]
    fn pending_lists_dirty_rows_in_row_order() {
        let mut set = ChangeSet::from_herbs(herbs());
        set.row_mut(3).unwrap().set_memo("");
        let ginseng = set.row_mut(2).unwrap();
        ginseng.set_amount(20);
        ginseng.set_last_stored_date(Some(d("2025-01-10")));

        let pending = set.pending();
        assert_eq!(pending.iter().map(|u| u.row_num).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(pending[0].original_amount, 12);
        assert_eq!(pending[0].new_amount, 20);
        assert_eq!(pending[1].new_memo, None);
        let fields: Vec<_> = pending[0].changes().iter().map(|c| c.field).collect();
        assert_eq!(fields, ["last_stored_date", "amount"]);
    }

    #[test]
    fn amount_never_goes_negative() {
        let mut set = ChangeSet::from_herbs(herbs());
        let row = set.row_mut(3).unwrap();
        row.adjust_amount(-10);
        assert_eq!(row.amount(), 0);
        row.set_amount(-1);
        assert_eq!(row.amount(), 0);
    }

    #[test]
    fn unknown_row_is_an_error() {
        let mut set = ChangeSet::from_herbs(herbs());
        assert_eq!(set.row_mut(9).unwrap_err(), ChangeSetError::UnknownRow(9));
    }

    #[test]
    fn blank_server_memo_matches_cleared_memo() {
        let mut blank = herbs();
        blank[1].memo = Some("  ".into());
        let mut set = ChangeSet::from_herbs(blank);

        let row = set.row_mut(2).unwrap();
        row.set_memo("");
        assert!(!row.is_dirty());
        assert!(set.pending().is_empty());

        set.row_mut(2).unwrap().set_memo("dried");
        let pending = set.pending();
        assert_eq!(pending[0].original_memo, None);
        assert_eq!(pending[0].new_memo.as_deref(), Some("dried"));
    }

    #[test]
    fn registration_is_trimmed_and_checked() {
        let names = ["Licorice", "Ginseng"];

        let ok = validate_registration(register("  Angelica ", 3), names).unwrap();
        assert_eq!(ok.name, "Angelica");
        assert_eq!(ok.memo, None);

        assert_eq!(validate_registration(register("   ", 3), names).unwrap_err(), ChangeSetError::EmptyName);
        assert_eq!(
            validate_registration(register("Ginseng ", 3), names).unwrap_err(),
            ChangeSetError::Duplicate("Ginseng".into())
        );
        assert_eq!(
            validate_registration(register("Angelica", -1), names).unwrap_err(),
            ChangeSetError::NegativeAmount(-1)
        );
    }
}
