use anyhow::{Context, Result};
use clap::Args;

use crate::api::{ApiConfig, HerbApi};
use crate::feed::{self, render};
use crate::telemetry;
use crate::telemetry::ops::stats::Phase as StatsPhase;
use crate::util::time::parse_day_str;

pub mod range;
pub mod summary;
pub mod types;

use range::DateRange;
use types::StatsReport;

/// herb stats: stored/delivered totals per herb over a date range
#[derive(Args, Debug)]
pub struct StatsCmd {
    /// First day (YYYY-MM-DD, Nd, today)
    #[arg(long)]
    pub from: String,
    /// Last day, inclusive
    #[arg(long)]
    pub to: String,
    /// Skip herbs without any activity in the range
    #[arg(long)]
    pub hide_zero: bool,
    /// Also print every log row per herb
    #[arg(long)]
    pub details: bool,
}

pub async fn run(cfg: &ApiConfig, args: StatsCmd) -> Result<()> {
    let log = telemetry::stats();
    let _g = log.root_span_kv([
        ("from", args.from.clone()),
        ("to", args.to.clone()),
        ("hide_zero", args.hide_zero.to_string()),
        ("details", args.details.to_string()),
    ]).entered();

    let from = parse_day_str(&args.from).with_context(|| format!("invalid --from: {}", args.from))?;
    let to = parse_day_str(&args.to).with_context(|| format!("invalid --to: {}", args.to))?;
    let range = DateRange::new(from, to)?;

    let api = HerbApi::new(cfg)?;
    let herbs = {
        let _s = log.span(&StatsPhase::FetchHerbs).entered();
        match api.list_herbs().await {
            Ok(h) => h,
            Err(e) => { log.api_error(&e); return Err(e.into()); }
        }
    };

    let (state, pages) = {
        let _s = log.span_kv(&StatsPhase::FetchLog, [("herbs", herbs.len().to_string())]).entered();
        let source = api.with_range(range.from, range.to);
        match feed::collect(source, cfg.cursor_mode.strategy(), None, |_, _, _| {}).await {
            Ok(done) => done,
            Err(e) => { log.api_error(&e); return Err(e.into()); }
        }
    };
    log.info_kv("log collected", [("pages", (pages + 1).to_string()), ("days", state.groups.len().to_string())]);

    let _s = log.span(&StatsPhase::Summarize).entered();
    let mut rows = summary::summarize(&range, &herbs, &state.groups, args.details);
    if args.hide_zero {
        rows = summary::hide_zero(rows);
    }
    if rows.is_empty() {
        log.warn("no herbs to report");
    }

    for r in &rows {
        log.info(format!("{:<16} stored {:>6}  delivered {:>6}", r.name, r.total_stored, r.total_delivered));
        for e in &r.entries {
            log.info(format!("    {}{}", e.logged_at.date(), render::render_line(e)));
        }
    }

    if telemetry::config::json_mode() {
        let report = StatsReport {
            range,
            total_stored: rows.iter().map(|r| r.total_stored).sum(),
            total_delivered: rows.iter().map(|r| r.total_delivered).sum(),
            herbs: rows,
        };
        log.result(&report)?;
    }
    Ok(())
}
