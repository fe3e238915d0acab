//! # Load Harness
//!
//! Drives a [`Scenario`] with concurrent virtual users. The scenario model does
//! not depend on anything in here; any scheduler that can call
//! [`Scenario::run_weighted_task`] in a loop can stand in for [`TokioHarness`].

pub mod metrics;
pub mod reporter;
pub mod runner;

pub use metrics::{
    EndpointReport, EndpointStats, FailureGroup, LatencyStats, MetricsCollector, MetricsSnapshot,
    TaskStats,
};
pub use runner::{HarnessSettings, TokioHarness};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::scenario::{Profile, Scenario};

#[async_trait]
pub trait Harness: Send + Sync {
    /// Run `scenario` until the harness's own stop condition or `shutdown` fires.
    async fn run(&self, scenario: Arc<Scenario>, shutdown: CancellationToken) -> Result<RunSummary>;
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub profile: Profile,
    pub users_started: usize,
    pub metrics: MetricsSnapshot,
    pub patients_created: usize,
    pub tests_created: usize,
}
