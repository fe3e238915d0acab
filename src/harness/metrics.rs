//! Request statistics - thread-safe aggregation with latency tracking

use hdrhistogram::{CreationError, Histogram};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

use crate::api::Endpoint;
use crate::scenario::{Failure, RequestRecord, TaskKind, TaskOutcome};

/// Response content kept in a failure group message, in characters.
pub const MAX_FAILURE_CONTENT: usize = 200;
/// Distinct failure groups kept before new messages fold into one group per endpoint.
pub const MAX_FAILURE_GROUPS: usize = 100;
pub const OVERFLOW_FAILURE_MESSAGE: &str = "other failures (group limit reached)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointStats {
    pub requests: u64,
    pub failures: u64,
    /// Invalid-branch requests the API rejected as expected.
    pub expected_rejections: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub executed: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyStats {
    pub min: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub max: u64,
    pub mean: f64,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub endpoint: Endpoint,
    pub stats: EndpointStats,
    /// Milliseconds.
    pub latency: LatencyStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureGroup {
    pub endpoint: Endpoint,
    pub message: String,
    pub occurrences: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub elapsed: Duration,
    pub endpoints: Vec<EndpointReport>,
    pub tasks: Vec<(TaskKind, TaskStats)>,
    pub failures: Vec<FailureGroup>,
}

impl MetricsSnapshot {
    pub fn total_requests(&self) -> u64 {
        self.endpoints.iter().map(|e| e.stats.requests).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.endpoints.iter().map(|e| e.stats.failures).sum()
    }

    pub fn total_expected_rejections(&self) -> u64 {
        self.endpoints.iter().map(|e| e.stats.expected_rejections).sum()
    }

    pub fn failure_ratio(&self) -> f64 {
        match self.total_requests() {
            0 => 0.0,
            n => self.total_failures() as f64 / n as f64,
        }
    }

    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_requests() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Option<&EndpointReport> {
        self.endpoints.iter().find(|e| e.endpoint == endpoint)
    }

    pub fn task(&self, task: TaskKind) -> TaskStats {
        self.tasks
            .iter()
            .find(|(t, _)| *t == task)
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }
}

struct EndpointEntry {
    stats: EndpointStats,
    latencies: Histogram<u64>,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<TaskKind, TaskStats>,
    failures: BTreeMap<(Endpoint, String), u64>,
}

#[derive(Clone)]
pub struct MetricsCollector {
    endpoints: Arc<RwLock<BTreeMap<Endpoint, EndpointEntry>>>,
    inner: Arc<RwLock<Inner>>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, CreationError> {
        let mut endpoints = BTreeMap::new();
        for endpoint in Endpoint::iter() {
            // 3 significant digits, auto-resizing
            endpoints.insert(
                endpoint,
                EndpointEntry {
                    stats: EndpointStats::default(),
                    latencies: Histogram::new(3)?,
                },
            );
        }
        Ok(Self {
            endpoints: Arc::new(RwLock::new(endpoints)),
            inner: Arc::new(RwLock::new(Inner::default())),
            start_time: Instant::now(),
        })
    }

    pub fn record_outcome(&self, task: TaskKind, outcome: &TaskOutcome) {
        {
            let mut inner = self.inner.write();
            let stats = inner.tasks.entry(task).or_default();
            if outcome.is_skipped() {
                stats.skipped += 1;
            } else {
                stats.executed += 1;
            }
        }
        for record in outcome.requests() {
            self.record_request(record);
        }
    }

    pub fn record_request(&self, record: &RequestRecord) {
        {
            let mut endpoints = self.endpoints.write();
            if let Some(entry) = endpoints.get_mut(&record.endpoint) {
                entry.stats.requests += 1;
                if record.is_expected_rejection() {
                    entry.stats.expected_rejections += 1;
                }
                if !record.is_success() {
                    entry.stats.failures += 1;
                }
                let _ = entry.latencies.record(record.elapsed.as_millis() as u64);
            }
        }
        if let Some(failure) = record.failure() {
            let mut key = (record.endpoint, group_message(failure));
            let mut inner = self.inner.write();
            if inner.failures.len() >= MAX_FAILURE_GROUPS && !inner.failures.contains_key(&key) {
                key.1 = OVERFLOW_FAILURE_MESSAGE.to_string();
            }
            *inner.failures.entry(key).or_default() += 1;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let endpoints = self
            .endpoints
            .read()
            .iter()
            .filter(|(_, entry)| entry.stats.requests > 0)
            .map(|(endpoint, entry)| EndpointReport {
                endpoint: *endpoint,
                stats: entry.stats,
                latency: latency_stats(&entry.latencies),
            })
            .collect();

        let inner = self.inner.read();
        let mut failures: Vec<FailureGroup> = inner
            .failures
            .iter()
            .map(|((endpoint, message), occurrences)| FailureGroup {
                endpoint: *endpoint,
                message: message.clone(),
                occurrences: *occurrences,
            })
            .collect();
        failures.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));

        MetricsSnapshot {
            elapsed: self.elapsed(),
            endpoints,
            tasks: inner.tasks.iter().map(|(t, s)| (*t, *s)).collect(),
            failures,
        }
    }
}

fn group_message(failure: &Failure) -> String {
    let mut content: String = failure.content.chars().take(MAX_FAILURE_CONTENT).collect();
    if failure.content.chars().nth(MAX_FAILURE_CONTENT).is_some() {
        content.push_str("...");
    }
    Failure {
        task: failure.task,
        status: failure.status,
        content,
    }
    .to_string()
}

fn latency_stats(hist: &Histogram<u64>) -> LatencyStats {
    if hist.is_empty() {
        return LatencyStats::default();
    }
    LatencyStats {
        min: hist.min(),
        p50: hist.value_at_quantile(0.50),
        p95: hist.value_at_quantile(0.95),
        p99: hist.value_at_quantile(0.99),
        max: hist.max(),
        mean: hist.mean(),
        count: hist.len(),
    }
}
