use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{info, warn, error, Span};

use crate::api::{ApiError, RenderHint};
use crate::output::types::Meta;

use super::emit;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) started: Instant,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{}", msg); }
    }

    /// Log a failed server call the way its render hint asks for: a fault page
    /// gets its summary plus the raw document at debug level.
    pub fn api_error(&self, err: &ApiError) {
        let report = err.report();
        if self.json {
            error!(op = %self.op_name(), kind = ?report.kind, status = ?report.status, retryable = err.is_retryable(), "{}", report.message);
        } else {
            error!("❌ {:?}: {}", report.kind, report.message);
        }
        if let (RenderHint::ReplaceDocument, ApiError::Fault { document, .. }) = (report.hint, err) {
            tracing::debug!(op = %self.op_name(), document = %document, "server error page");
        }
    }

    fn meta(&self) -> Option<Meta> { Some(Meta { duration_ms: Some(self.started.elapsed().as_millis()) }) }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print_plan(self.op_name(), plan, self.meta()) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { emit::print_result(self.op_name(), result, self.meta()) }
}

impl LogCtx<crate::telemetry::ops::feed::Feed> {
    pub fn page_summary(&self, page: usize, date_groups: usize, has_next_page: bool) {
        if self.json { info!(op = %self.op_name(), page, date_groups, has_next_page, "page_merged"); }
        else { info!("📄 Page {} merged: date_groups={} has_next_page={}", page, date_groups, has_next_page); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
