pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::{LogCtx, OpMarker};

pub fn feed() -> LogCtx<ops::feed::Feed> { ctx() }
pub fn stats() -> LogCtx<ops::stats::Stats> { ctx() }
pub fn inventory() -> LogCtx<ops::inventory::Inventory> { ctx() }

fn ctx<O: OpMarker>() -> LogCtx<O> {
    LogCtx { json: config::logs_are_json(), started: std::time::Instant::now(), _marker: std::marker::PhantomData }
}
