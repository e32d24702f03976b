pub mod changeset;
pub mod types;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Subcommand};

use crate::api::{ApiConfig, HerbApi};
use crate::telemetry::{self};
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::inventory::{Inventory, Phase as InvPhase};
use crate::util::time::parse_day_str;

use self::changeset::{validate_registration, ChangeSet};
use self::types::{DeletePlan, EditPlan, EditResult, Herb, HerbRegister, InventoryList, MutationResult, RegisterPlan};

#[derive(Args)]
pub struct InventoryCmd {
    #[command(subcommand)]
    pub command: InventoryCommand,
}

#[derive(Subcommand)]
pub enum InventoryCommand {
    /// List herbs, optionally filtered by name
    Ls {
        #[arg(long)] keyword: Option<String>,
    },
    /// Edit one row; plan-only unless --apply
    Edit {
        row: u32,
        #[arg(long, conflicts_with = "add")] amount: Option<i64>,
        /// Add to (or with a negative value, take from) the current amount
        #[arg(long, allow_hyphen_values = true)] add: Option<i64>,
        #[arg(long)] date: Option<String>,
        /// New memo; an empty string clears it
        #[arg(long)] memo: Option<String>,
        #[arg(long, default_value_t = false)] apply: bool,
    },
    /// Register a new herb
    Add {
        #[arg(long)] name: String,
        #[arg(long)] amount: i64,
        /// Last stored day (default: today)
        #[arg(long)] date: Option<String>,
        #[arg(long)] memo: Option<String>,
        #[arg(long, default_value_t = false)] apply: bool,
    },
    /// Delete a herb by row number
    Rm {
        row: u32,
        #[arg(long, default_value_t = false)] apply: bool,
    },
}

pub async fn run(cfg: &ApiConfig, args: InventoryCmd) -> Result<()> {
    let log = telemetry::inventory();
    let api = HerbApi::new(cfg)?;
    match args.command {
        InventoryCommand::Ls { keyword } => {
            let _g = log.root_span_kv([("cmd", "ls".to_string()), ("keyword", format!("{:?}", keyword))]).entered();
            list(&log, &api, keyword).await
        }
        InventoryCommand::Edit { row, amount, add, date, memo, apply } => {
            let _g = log.root_span_kv([
                ("cmd", "edit".to_string()),
                ("row", row.to_string()),
                ("apply", apply.to_string()),
            ]).entered();
            let date = date.map(|d| parse_day_str(&d).with_context(|| format!("invalid --date: {}", d))).transpose()?;
            let herbs = fetch_herbs(&log, &api).await?;

            let _sp = log.span(&InvPhase::Plan).entered();
            let mut set = ChangeSet::from_herbs(herbs);
            let herb = set.row_mut(row)?;
            if let Some(n) = amount { herb.set_amount(n); }
            if let Some(n) = add { herb.adjust_amount(n); }
            if let Some(d) = date { herb.set_last_stored_date(Some(d)); }
            if let Some(m) = memo.as_deref() { herb.set_memo(m); }

            let updates = set.pending();
            let Some(update) = updates.first().cloned() else {
                log.info("ℹ️  No changes");
                return Ok(());
            };
            let changes = update.changes();
            log.info(format!("📝 Edit plan: row={} name={}", update.row_num, update.name));
            for c in &changes {
                log.info(format!("  {}: {} → {}", c.field, c.before, c.after));
            }
            drop(_sp);

            if !apply {
                log.info("   Use --apply to execute.");
                if telemetry::config::json_mode() { log.plan(&EditPlan { update, changes })?; }
                return Ok(());
            }

            let _sa = log.span(&InvPhase::Apply).entered();
            if let Err(e) = api.update_herbs(&updates).await { log.api_error(&e); return Err(e.into()); }
            log.info(format!("✅ Updated {} row(s)", updates.len()));
            if telemetry::config::json_mode() { log.result(&EditResult { updated: updates.len() })?; }
            Ok(())
        }
        InventoryCommand::Add { name, amount, date, memo, apply } => {
            let _g = log.root_span_kv([("cmd", "add".to_string()), ("name", name.clone()), ("apply", apply.to_string())]).entered();
            let last_stored_date = match date {
                Some(d) => parse_day_str(&d).with_context(|| format!("invalid --date: {}", d))?,
                None => Local::now().date_naive(),
            };
            let names = {
                let _s = log.span(&InvPhase::FetchHerbs).entered();
                match api.herb_names().await {
                    Ok(n) => n,
                    Err(e) => { log.api_error(&e); return Err(e.into()); }
                }
            };

            let _sp = log.span(&InvPhase::Plan).entered();
            let herb = validate_registration(
                HerbRegister { name, amount, last_stored_date, memo },
                names.iter().map(String::as_str),
            )?;
            log.info(format!("📝 Register plan: name={} amount={} last_stored_date={}", herb.name, herb.amount, herb.last_stored_date));
            drop(_sp);

            if !apply {
                log.info("   Use --apply to execute.");
                if telemetry::config::json_mode() { log.plan(&RegisterPlan { herb })?; }
                return Ok(());
            }

            let _sa = log.span(&InvPhase::Apply).entered();
            if let Err(e) = api.register_herb(&herb).await { log.api_error(&e); return Err(e.into()); }
            log.info(format!("✅ Registered {}", herb.name));
            if telemetry::config::json_mode() { log.result(&MutationResult { action: "register", name: herb.name })?; }
            Ok(())
        }
        InventoryCommand::Rm { row, apply } => {
            let _g = log.root_span_kv([("cmd", "rm".to_string()), ("row", row.to_string()), ("apply", apply.to_string())]).entered();
            let herbs = fetch_herbs(&log, &api).await?;
            let herb = herbs
                .into_iter()
                .find(|h| h.row_num == row)
                .ok_or(changeset::ChangeSetError::UnknownRow(row))?;
            log.info(format!("📝 Delete plan: row={} name={} amount={}", herb.row_num, herb.name, herb.amount));

            if !apply {
                log.info("   Use --apply to execute.");
                if telemetry::config::json_mode() { log.plan(&DeletePlan { herb })?; }
                return Ok(());
            }

            let _sa = log.span(&InvPhase::Apply).entered();
            if let Err(e) = api.delete_herb(&herb).await { log.api_error(&e); return Err(e.into()); }
            log.info(format!("🗑️  Deleted {}", herb.name));
            if telemetry::config::json_mode() { log.result(&MutationResult { action: "delete", name: herb.name })?; }
            Ok(())
        }
    }
}

async fn fetch_herbs(log: &LogCtx<Inventory>, api: &HerbApi) -> Result<Vec<Herb>> {
    let _s = log.span(&InvPhase::FetchHerbs).entered();
    match api.list_herbs().await {
        Ok(h) => Ok(h),
        Err(e) => { log.api_error(&e); Err(e.into()) }
    }
}

async fn list(log: &LogCtx<Inventory>, api: &HerbApi, keyword: Option<String>) -> Result<()> {
    let herbs = fetch_herbs(log, api).await?;
    let _s = log.span(&InvPhase::List).entered();
    let herbs = filter_by_keyword(herbs, keyword.as_deref());
    for h in &herbs {
        log.info(format!(
            "  #{:<4} {:<16} {:>6}  {}  {}",
            h.row_num,
            h.name,
            h.amount,
            h.last_stored_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            h.memo.as_deref().unwrap_or(""),
        ));
    }
    log.info(format!("   {} herb(s)", herbs.len()));
    if telemetry::config::json_mode() {
        log.result(&InventoryList { keyword, herbs })?;
    }
    Ok(())
}

fn filter_by_keyword(herbs: Vec<Herb>, keyword: Option<&str>) -> Vec<Herb> {
    let Some(kw) = keyword.map(str::trim).filter(|k| !k.is_empty()) else { return herbs };
    let kw = kw.to_lowercase();
    herbs.into_iter().filter(|h| h.name.to_lowercase().contains(&kw)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn herb(row_num: u32, name: &str) -> Herb {
        Herb { row_num, name: name.into(), amount: 1, last_stored_date: None, memo: None }
    }

    #[test]
    fn keyword_filter_is_case_insensitive_substring() {
        let herbs = vec![herb(2, "Ginseng"), herb(3, "Red Ginseng"), herb(4, "Licorice")];
        let hits = filter_by_keyword(herbs.clone(), Some("ginSENG"));
        assert_eq!(hits.iter().map(|h| h.row_num).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(filter_by_keyword(herbs.clone(), Some("  ")).len(), 3);
        assert_eq!(filter_by_keyword(herbs, None).len(), 3);
    }
}
