//! Dispatch metrics.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatched requests by handler kind
//! - `dispatch_catch_all_total` (counter): requests no handler accepted
//! - `dispatch_rewrites_applied_total` (counter): rewrite rules applied
//! - `dispatch_requests_aborted_total` (counter): requests dropped by reason

use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn metric emission on or off process-wide.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Record a completed dispatch.
pub fn record_dispatch(handler: &'static str, catch_all: bool) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("dispatch_requests_total", "handler" => handler).increment(1);
    if catch_all {
        ::metrics::counter!("dispatch_catch_all_total").increment(1);
    }
}

/// Record rewrites applied to one request.
pub fn record_rewrites(applied: usize) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("dispatch_rewrites_applied_total").increment(applied as u64);
}

/// Record a request dropped before dispatch.
pub fn record_aborted(reason: &'static str) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("dispatch_requests_aborted_total", "reason" => reason).increment(1);
}
