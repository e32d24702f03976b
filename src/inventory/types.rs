use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A herb stock row as the server returns it. Row numbers start at 2 (row 1
/// of the backing sheet is the header).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Herb {
    pub row_num: u32,
    pub name: String,
    pub amount: i64,
    pub last_stored_date: Option<NaiveDate>,
    pub memo: Option<String>,
}

/// Bulk-edit payload. The `original_*` fields are what the server compares
/// against its current row before writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbUpdate {
    pub row_num: u32,
    pub name: String,
    pub original_amount: i64,
    pub new_amount: i64,
    pub original_last_stored_date: Option<NaiveDate>,
    pub new_last_stored_date: Option<NaiveDate>,
    pub original_memo: Option<String>,
    pub new_memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

impl HerbUpdate {
    pub fn is_amount_changed(&self) -> bool { self.original_amount != self.new_amount }
    pub fn is_last_stored_date_changed(&self) -> bool { self.original_last_stored_date != self.new_last_stored_date }
    pub fn is_memo_changed(&self) -> bool { self.original_memo != self.new_memo }

    pub fn is_changed(&self) -> bool {
        self.is_amount_changed() || self.is_last_stored_date_changed() || self.is_memo_changed()
    }

    pub fn changes(&self) -> Vec<FieldChange> {
        let mut out = Vec::new();
        if self.is_last_stored_date_changed() {
            out.push(FieldChange {
                field: "last_stored_date",
                before: show_date(self.original_last_stored_date),
                after: show_date(self.new_last_stored_date),
            });
        }
        if self.is_amount_changed() {
            out.push(FieldChange {
                field: "amount",
                before: self.original_amount.to_string(),
                after: self.new_amount.to_string(),
            });
        }
        if self.is_memo_changed() {
            out.push(FieldChange {
                field: "memo",
                before: show_memo(self.original_memo.as_deref()),
                after: show_memo(self.new_memo.as_deref()),
            });
        }
        out
    }
}

fn show_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string())
}

fn show_memo(m: Option<&str>) -> String {
    m.unwrap_or("(none)").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbRegister {
    pub name: String,
    pub amount: i64,
    pub last_stored_date: NaiveDate,
    pub memo: Option<String>,
}

// Plan/result envelope types
#[derive(Serialize)]
pub struct InventoryList {
    pub keyword: Option<String>,
    pub herbs: Vec<Herb>,
}

#[derive(Serialize)]
pub struct EditPlan {
    pub update: HerbUpdate,
    pub changes: Vec<FieldChange>,
}

#[derive(Serialize)]
pub struct EditResult {
    pub updated: usize,
}

#[derive(Serialize)]
pub struct RegisterPlan {
    pub herb: HerbRegister,
}

#[derive(Serialize)]
pub struct DeletePlan {
    pub herb: Herb,
}

#[derive(Serialize)]
pub struct MutationResult {
    pub action: &'static str,
    pub name: String,
}
