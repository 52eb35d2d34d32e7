//! Time-window deduplication of alerts.

use std::{
    future::Future,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::debug;

/// Outcome of offering a non-empty breach set to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The alert was sent and the window restarted
    Emitted,
    /// The previous alert is too recent; nothing was sent
    Suppressed,
}

/// Whether an alert offered at a given instant would be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Quiet,
    Cooldown { remaining: Duration },
}

/// Allows at most one alert per `interval`.
///
/// The last emission time only moves after a successful send, so a failed
/// delivery does not start a cooldown.
#[derive(Debug)]
pub struct AlertGate {
    interval: Duration,
    last_emission: Mutex<Option<Instant>>,
}

impl AlertGate {
    /// A zero `interval` lets every alert through.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emission: Mutex::new(None),
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn last_emission(&self) -> Option<Instant> {
        *self.last_emission.lock().await
    }

    pub async fn state(&self, now: Instant) -> GateState {
        self.state_after(*self.last_emission.lock().await, now)
    }

    fn state_after(&self, last: Option<Instant>, now: Instant) -> GateState {
        match last {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= self.interval {
                    GateState::Quiet
                } else {
                    GateState::Cooldown {
                        remaining: self.interval - elapsed,
                    }
                }
            }
            None => GateState::Quiet,
        }
    }

    /// Run `emit` unless an alert went out less than `interval` before `now`.
    ///
    /// The gate stays locked while `emit` runs. Errors from `emit` are returned
    /// unchanged and leave the gate as it was.
    pub async fn try_emit<F, Fut>(&self, now: Instant, emit: F) -> eyre::Result<GateDecision>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = eyre::Result<()>>,
    {
        let mut last = self.last_emission.lock().await;

        if let GateState::Cooldown { remaining } = self.state_after(*last, now) {
            debug!(?remaining, "Alert suppressed");
            return Ok(GateDecision::Suppressed);
        }

        emit().await?;
        *last = Some(now);

        Ok(GateDecision::Emitted)
    }
}
