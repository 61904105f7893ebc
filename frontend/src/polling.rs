//! Shared refresh cadence for the badge and notification pollers.

use futures::stream::{self, Stream, StreamExt};
use gloo_timers::future::IntervalStream;

/// Rate limit for background refreshes.
///
/// Forced refreshes (startup, tab visible again, dropdown opened) always
/// run; periodic ones are skipped when the previous refresh started less
/// than `min_gap_ms` ago.
#[derive(Debug, Clone, Copy)]
pub struct RefreshGate {
    min_gap_ms: f64,
    last_started_ms: Option<f64>,
}

impl RefreshGate {
    pub fn new(min_gap_ms: u32) -> Self {
        Self {
            min_gap_ms: f64::from(min_gap_ms),
            last_started_ms: None,
        }
    }

    /// Records the refresh when it may start.
    pub fn try_begin(&mut self, now_ms: f64, force: bool) -> bool {
        let due = match self.last_started_ms {
            None => true,
            Some(last) => now_ms - last >= self.min_gap_ms,
        };
        if force || due {
            self.last_started_ms = Some(now_ms);
            true
        } else {
            false
        }
    }
}

/// Refresh requests: one forced request immediately, then `false` on every
/// interval tick and `true` for each item of `forced`.
pub fn refresh_requests(
    interval_ms: u32,
    forced: impl Stream<Item = ()> + Unpin + 'static,
) -> impl Stream<Item = bool> + Unpin {
    let ticks = IntervalStream::new(interval_ms).map(|()| false);
    stream::once(async { true }).chain(stream::select(ticks, forced.map(|()| true))).boxed_local()
}
