use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use crate::api::{ApiConfig, ApiError, HerbApi};
use crate::telemetry;
use crate::telemetry::ops::feed::Phase as FeedPhase;
use crate::util::time::parse_day_opt;

pub mod controller;
pub mod cursor;
pub mod merge;
pub mod render;
pub mod source;
pub mod types;

use controller::{FeedController, FeedState};
use cursor::CursorStrategy;
use source::LogSource;

/// herb log: page through the change log, newest first
#[derive(Args)]
pub struct LogCmd {
    /// Stop after this many pages beyond the first (default: until the log is exhausted)
    #[arg(long)]
    pub max_pages: Option<usize>,
    /// Only entries logged on or after this day (YYYY-MM-DD, Nd, today)
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Only entries logged on or before this day
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

pub async fn run(cfg: &ApiConfig, args: LogCmd) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([
        ("cursor", cfg.cursor_mode.strategy().name().to_string()),
        ("max_pages", format!("{:?}", args.max_pages)),
        ("from", format!("{:?}", args.from)),
        ("to", format!("{:?}", args.to)),
    ]).entered();

    let mut api = HerbApi::new(cfg)?;
    if let (Some(from), Some(to)) = (parse_day_opt(&args.from)?, parse_day_opt(&args.to)?) {
        let range = crate::stats::range::DateRange::new(from, to)?;
        api = api.with_range(range.from, range.to);
    }
    let strategy = cfg.cursor_mode.strategy();

    let (state, loaded) = {
        let _s = log.span(&FeedPhase::Fetch).entered();
        match collect(api, strategy, args.max_pages, |page, groups, next| log.page_summary(page, groups, next)).await {
            Ok(done) => done,
            Err(e) => { log.api_error(&e); return Err(e.into()); }
        }
    };

    let _s = log.span(&FeedPhase::Render).entered();
    for line in render::render_feed(&state.groups) {
        log.info(line);
    }
    if state.has_next_page {
        log.info(format!("   More entries available (next cursor: {}).", state.cursor.as_ref().map(|c| c.to_string()).unwrap_or_default()));
    }

    if telemetry::config::json_mode() {
        let listing = types::FeedListing {
            pages: loaded + 1,
            has_next_page: state.has_next_page,
            cursor: state.cursor.map(|c| c.to_string()),
            groups: state.groups,
        };
        log.result(&listing)?;
    }
    Ok(())
}

/// Fetch the first page, then keep loading through the controller.
/// `on_page` sees every page including the first (page 0).
pub(crate) async fn collect<S, C>(
    source: S,
    strategy: Arc<dyn CursorStrategy>,
    max_pages: Option<usize>,
    mut on_page: C,
) -> Result<(FeedState, usize), ApiError>
where
    S: LogSource,
    C: FnMut(usize, usize, bool),
{
    let seed = source.fetch_page(strategy.as_ref(), None).await?;
    on_page(0, seed.data.len(), seed.has_next_page);

    let ctl = FeedController::new(source, strategy);
    ctl.initialize(seed.into());
    let loaded = ctl.load_pages(max_pages, on_page).await?;
    Ok((ctl.into_state(), loaded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::cursor::PageCursor;
    use crate::feed::source::mock::MockSource;
    use crate::feed::types::LogPage;

    #[tokio::test]
    async fn collect_seeds_then_follows_cursor() {
        let source = MockSource::new();
        source.push_response(Ok(LogPage { data: Vec::new(), cursor: PageCursor.parse("2").ok(), has_next_page: true }));
        source.push_response(Ok(LogPage { data: Vec::new(), cursor: None, has_next_page: false }));

        let mut pages = Vec::new();
        let (state, loaded) = collect(source, Arc::new(PageCursor), None, |p, _, next| pages.push((p, next)))
            .await
            .unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(pages, vec![(0, true), (1, false)]);
        assert!(!state.has_next_page);
    }

    #[tokio::test]
    async fn collect_reports_first_page_failure() {
        let err = collect(MockSource::new(), Arc::new(PageCursor), None, |_, _, _| {}).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
