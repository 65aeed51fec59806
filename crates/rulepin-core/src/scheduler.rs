//! Fixed-cadence reconciliation loop.
//!
//! A cycle is fetch, decide, write when needed, log, record health. Cycles
//! never overlap: the timer is only polled between them. Failures are logged
//! and recorded, and the next cycle runs at the normal period.

use crate::client::RuleClient;
use crate::config::Config;
use crate::error::Result;
use crate::health::HealthState;
use crate::reconcile::{decide, Action};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// What a successful cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The target rule was already last.
    Unchanged { rule_count: usize },
    /// The list was rewritten with the target rule last.
    Moved { rule_count: usize },
}

/// Run one reconciliation cycle: one fetch and at most one write.
pub async fn run_cycle(client: &RuleClient, target_rule: &str) -> Result<CycleOutcome> {
    let rules = client.fetch().await?;
    info!(count = rules.len(), "fetched user rules");

    match decide(&rules, target_rule) {
        Action::NoOp => {
            info!("target rule is already last, no action needed");
            Ok(CycleOutcome::Unchanged {
                rule_count: rules.len(),
            })
        }
        Action::Reorder(updated) => {
            info!(
                "moving target rule to last position (rule {} of {})",
                updated.len(),
                updated.len()
            );
            client.write(&updated).await?;
            info!("updated user rules");
            Ok(CycleOutcome::Moved {
                rule_count: updated.len(),
            })
        }
    }
}

pub struct Scheduler {
    client: RuleClient,
    target_rule: String,
    period: Duration,
    health: Arc<HealthState>,
}

impl Scheduler {
    pub fn new(
        client: RuleClient,
        target_rule: impl Into<String>,
        period: Duration,
        health: Arc<HealthState>,
    ) -> Self {
        Self {
            client,
            target_rule: target_rule.into(),
            period,
            health,
        }
    }

    pub fn from_config(config: &Config, health: Arc<HealthState>) -> Result<Self> {
        Ok(Self::new(
            RuleClient::new(config)?,
            config.target_rule.clone(),
            config.check_interval,
            health,
        ))
    }

    /// Run one cycle and record its result. Returns whether it succeeded.
    pub async fn tick(&self) -> bool {
        match run_cycle(&self.client, &self.target_rule).await {
            Ok(_) => {
                self.health.record_cycle(true);
                true
            }
            Err(e) => {
                let failures = self.health.record_cycle(false);
                error!(
                    kind = e.kind().as_str(),
                    consecutive_failures = failures,
                    "reconciliation cycle failed: {e}"
                );
                false
            }
        }
    }

    /// Run a cycle immediately, then one every period until `stop` flips to
    /// `true` or its sender is dropped.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        if *stop.borrow() {
            return;
        }
        self.tick().await;

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        info!("scheduler stopped");
                        break;
                    }
                }
            }
        }
    }
}
