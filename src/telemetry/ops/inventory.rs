use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Inventory;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, FetchHerbs, List, Apply }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::FetchHerbs => "fetch_herbs",
        Phase::List => "list",
        Phase::Apply => "apply",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::FetchHerbs => info_span!("fetch_herbs"),
        Phase::List => info_span!("list"),
        Phase::Apply => info_span!("apply"),
    }}
}

impl OpMarker for Inventory {
    const NAME: &'static str = "inventory";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("inventory") }
}
