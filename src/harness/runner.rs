use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::{reporter, Harness, MetricsCollector, RunSummary};
use crate::config::{self, Config, ThinkTime};
use crate::scenario::{Scenario, UserContext};

#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub users: usize,
    /// Users started per second.
    pub spawn_rate: f64,
    pub run_duration: Duration,
    pub think_time: ThinkTime,
    /// Stop each user after this many tasks, skipped ones included.
    pub iterations: Option<u64>,
    pub random_seed: Option<u64>,
    pub report_interval: Duration,
}

impl HarnessSettings {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            users: cfg.load.users,
            spawn_rate: cfg.load.spawn_rate,
            run_duration: cfg.load.run_duration(),
            think_time: cfg.load.think_time()?,
            iterations: None,
            random_seed: cfg.load.random_seed,
            report_interval: Duration::from_secs(cfg.report.interval_seconds.max(1)),
        })
    }
}

/// In-process harness: every virtual user is a tokio task.
pub struct TokioHarness {
    settings: HarnessSettings,
}

impl TokioHarness {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }
}

#[async_trait]
impl Harness for TokioHarness {
    async fn run(&self, scenario: Arc<Scenario>, shutdown: CancellationToken) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let settings = &self.settings;
        let spawn_interval = config::spawn_interval(settings.spawn_rate)?;
        let metrics = MetricsCollector::new().context("failed to create latency histograms")?;
        let stop = shutdown.child_token();

        info!(
            %run_id,
            profile = %scenario.profile(),
            users = settings.users,
            spawn_rate = settings.spawn_rate,
            duration_s = settings.run_duration.as_secs(),
            "starting load test"
        );

        let timer = {
            let stop = stop.clone();
            let run_duration = settings.run_duration;
            tokio::spawn(async move {
                tokio::select! {
                    _ = sleep(run_duration) => {
                        info!("run duration elapsed");
                        stop.cancel();
                    }
                    _ = stop.cancelled() => {}
                }
            })
        };

        let report = tokio::spawn(reporter::periodic(
            metrics.clone(),
            Arc::clone(scenario.state()),
            settings.report_interval,
            stop.clone(),
        ));

        let mut users = JoinSet::new();
        for user_id in 0..settings.users {
            if stop.is_cancelled() {
                break;
            }
            let ctx = scenario.user_context(user_id, settings.random_seed);
            let span = tracing::info_span!("user", user_id);
            users.spawn(
                virtual_user(
                    Arc::clone(&scenario),
                    ctx,
                    metrics.clone(),
                    settings.think_time,
                    settings.iterations,
                    stop.clone(),
                )
                .instrument(span),
            );
            debug!(user_id, "virtual user started");

            if user_id + 1 < settings.users && !spawn_interval.is_zero() {
                tokio::select! {
                    _ = sleep(spawn_interval) => {}
                    _ = stop.cancelled() => break,
                }
            }
        }
        let users_started = users.len();
        info!(users_started, "all virtual users started");

        while let Some(joined) = users.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "virtual user aborted");
            }
        }

        stop.cancel();
        let _ = timer.await;
        let _ = report.await;

        let state = scenario.state();
        let summary = RunSummary {
            run_id,
            profile: scenario.profile(),
            users_started,
            metrics: metrics.snapshot(),
            patients_created: state.patient_count(),
            tests_created: state.test_count(),
        };
        info!(
            %run_id,
            requests = summary.metrics.total_requests(),
            failures = summary.metrics.total_failures(),
            "load test finished"
        );
        Ok(summary)
    }
}

async fn virtual_user(
    scenario: Arc<Scenario>,
    mut ctx: UserContext,
    metrics: MetricsCollector,
    think_time: ThinkTime,
    iterations: Option<u64>,
    stop: CancellationToken,
) {
    let mut completed = 0u64;
    while !stop.is_cancelled() {
        if iterations.is_some_and(|limit| completed >= limit) {
            break;
        }

        let (task, outcome) = tokio::select! {
            result = scenario.run_weighted_task(&mut ctx) => result,
            _ = stop.cancelled() => break,
        };
        completed += 1;

        for failure in outcome.failures() {
            warn!(task = %task, status = ?failure.status, "{failure}");
        }
        metrics.record_outcome(task, &outcome);

        let pause = think_time.sample(&mut ctx.rng);
        tokio::select! {
            _ = sleep(pause) => {}
            _ = stop.cancelled() => break,
        }
    }
    debug!(user_id = ctx.user_id, completed, "virtual user stopped");
}
