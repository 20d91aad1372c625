//! Bounded polling in place of completion events.
//!
//! The storefront exposes no signal for "the overlay is attached" or "the
//! table finished re-rendering", so interested callers probe a fixed number
//! of times with a settle interval between probes.

use std::future::Future;
use std::time::Duration;

/// Probe up to `attempts` times, sleeping `settle` between probes, until the
/// probe yields a value. `None` means the condition never materialized
/// within the budget.
pub async fn poll_until<T, F, Fut>(attempts: u32, settle: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 0..attempts {
        if let Some(value) = probe().await {
            return Some(value);
        }
        if attempt + 1 < attempts && !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
    }
    None
}
