//! Process-local counter state behind the sink boundary.

use serde::Serialize;
use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

///
/// OpsCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OpsCounters {
    pub fetch_cycles: u64,
    pub fetch_context_hits: u64,
    pub fetch_cache_hits: u64,
    pub fetch_actions: u64,
    pub fetch_queries: u64,
    pub fetch_skipped: u64,
    pub markers_placed: u64,
    pub markers_replaced: u64,
    pub markers_suppressed: u64,
    pub geocode_requests: u64,
    pub geocode_failures: u64,
    pub stale_drops: u64,
    pub attribute_writes: u64,
    pub action_failures: u64,
}

///
/// EventState
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventState {
    pub(crate) ops: OpsCounters,
}

///
/// EventReport
///
/// Point-in-time counter snapshot for host surfaces and tests.
///

#[derive(Clone, Debug, Serialize)]
pub struct EventReport {
    pub counters: OpsCounters,
}

pub(crate) fn with_state_mut<T>(f: impl FnOnce(&mut EventState) -> T) -> T {
    STATE.with(|cell| f(&mut cell.borrow_mut()))
}

pub(crate) fn report() -> EventReport {
    STATE.with(|cell| EventReport {
        counters: cell.borrow().ops.clone(),
    })
}

pub(crate) fn reset_all() {
    STATE.with(|cell| {
        *cell.borrow_mut() = EventState::default();
    });
}
