pub mod config;
pub mod metrics;

use alert::{AlertGate, GateDecision, MessageComposer, Notifier};
use balance::{Asset, Monitor, ThresholdEvaluator, Wallet};
use crate::{config::Config, metrics::Metrics};
use eyre::WrapErr;
use std::{
    future::Future,
    time::{Duration, Instant},
};
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

/// Result of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every balance is at or above its threshold
    AllClear,
    /// Breaches were found and an alert was sent
    Alerted { breaches: usize },
    /// Breaches were found but the last alert is too recent
    Suppressed { breaches: usize },
}

/// One polling flow: evaluator, alert gate, composer and notifier.
pub struct Watchdog<M, N> {
    evaluator: ThresholdEvaluator<M>,
    gate: AlertGate,
    composer: MessageComposer,
    notifier: N,
    wallets: Vec<Wallet>,
    assets: Vec<Asset>,
    metrics: Metrics,
}

impl<M, N> Watchdog<M, N>
where
    M: Monitor,
    N: Notifier,
{
    pub fn new(config: &Config, monitor: M, notifier: N) -> Self {
        Self {
            evaluator: ThresholdEvaluator::new(monitor, config.network.native_symbol.clone()),
            gate: AlertGate::new(config.alert_interval),
            composer: MessageComposer::new(config.network.clone(), config.message_style.clone()),
            notifier,
            wallets: config.wallets.clone(),
            assets: config.assets.clone(),
            metrics: Metrics::new(),
        }
    }

    pub const fn gate(&self) -> &AlertGate {
        &self.gate
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Evaluate all balances and alert if the gate allows it.
    ///
    /// Any query or delivery error is returned; the caller is expected to stop.
    pub async fn run_cycle(&self, now: Instant) -> eyre::Result<CycleOutcome> {
        let started = Instant::now();
        let result = self.evaluate_and_alert(now).await;
        self.metrics.record_cycle(result.is_ok(), started.elapsed());
        result
    }

    /// Run a pass every `poll_interval` until `shutdown` resolves or a pass fails.
    ///
    /// `shutdown` is also watched while a pass is in flight.
    pub async fn run<S>(&self, poll_interval: Duration, shutdown: S) -> eyre::Result<()>
    where
        S: Future,
    {
        let mut interval = time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(());
                }
            }

            let outcome = tokio::select! {
                outcome = self.run_cycle(Instant::now()) => outcome,
                _ = &mut shutdown => {
                    info!("Shutdown requested during a pass");
                    return Ok(());
                }
            };

            match outcome? {
                CycleOutcome::AllClear => {}
                CycleOutcome::Alerted { breaches } | CycleOutcome::Suppressed { breaches } => {
                    info!(breaches, "Pass complete");
                }
            }
        }
    }

    async fn evaluate_and_alert(&self, now: Instant) -> eyre::Result<CycleOutcome> {
        let breaches = self
            .evaluator
            .evaluate(&self.wallets, &self.assets)
            .await
            .wrap_err("Failed to evaluate balances")?;

        self.metrics.record_breaches(breaches.len());
        if breaches.is_empty() {
            info!("All balances above thresholds");
            return Ok(CycleOutcome::AllClear);
        }

        let decision = self
            .gate
            .try_emit(now, || async {
                let message = self.composer.compose(&breaches);
                self.notifier
                    .send(&message)
                    .await
                    .wrap_err("Failed to send alert")
            })
            .await?;

        let count = breaches.len();
        match decision {
            GateDecision::Emitted => {
                info!(breaches = count, "Alert sent");
                self.metrics.record_alert_emitted();
                Ok(CycleOutcome::Alerted { breaches: count })
            }
            GateDecision::Suppressed => {
                let state = self.gate.state(now).await;
                info!(
                    breaches = count,
                    ?state,
                    "Alert suppressed, previous alert too recent"
                );
                self.metrics.record_alert_suppressed();
                Ok(CycleOutcome::Suppressed { breaches: count })
            }
        }
    }
}
