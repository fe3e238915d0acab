//! Periodic progress logging and the end-of-run summary table

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{MetricsCollector, RunSummary};
use crate::state::ScenarioState;

/// Log a progress line every `every` until `stop` fires.
pub async fn periodic(
    metrics: MetricsCollector,
    state: Arc<ScenarioState>,
    every: Duration,
    stop: CancellationToken,
) {
    let mut ticker = interval(every.max(Duration::from_millis(1)));
    // first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.cancelled() => break,
        }
        let snap = metrics.snapshot();
        info!(
            elapsed_s = snap.elapsed.as_secs(),
            requests = snap.total_requests(),
            failures = snap.total_failures(),
            expected_rejections = snap.total_expected_rejections(),
            rps = (snap.requests_per_second() * 100.0).round() / 100.0,
            patients = state.patient_count(),
            tests = state.test_count(),
            "progress"
        );
    }
}

pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, summary)
}

pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    let m = &summary.metrics;
    let elapsed = m.elapsed.as_secs();

    writeln!(out, "Run {} ({})", summary.run_id, summary.profile)?;
    writeln!(
        out,
        "Elapsed {:02}:{:02}:{:02}  users {}  patients created {}  tests created {}",
        elapsed / 3600,
        (elapsed % 3600) / 60,
        elapsed % 60,
        summary.users_started,
        summary.patients_created,
        summary.tests_created
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<34} {:>8} {:>8} {:>9} {:>7} {:>7} {:>7} {:>7} {:>9}",
        "Endpoint", "Reqs", "Fails", "Rejected", "p50", "p95", "p99", "max", "mean"
    )?;
    writeln!(out, "{}", "-".repeat(104))?;
    for e in &m.endpoints {
        writeln!(
            out,
            "{:<34} {:>8} {:>8} {:>9} {:>7} {:>7} {:>7} {:>7} {:>9.2}",
            e.endpoint.to_string(),
            e.stats.requests,
            e.stats.failures,
            e.stats.expected_rejections,
            e.latency.p50,
            e.latency.p95,
            e.latency.p99,
            e.latency.max,
            e.latency.mean
        )?;
    }
    writeln!(out, "{}", "-".repeat(104))?;
    writeln!(
        out,
        "{:<34} {:>8} {:>8} {:>9}   {:.2} req/s, {:.2}% failed",
        "Total",
        m.total_requests(),
        m.total_failures(),
        m.total_expected_rejections(),
        m.requests_per_second(),
        m.failure_ratio() * 100.0
    )?;

    let skipped: Vec<_> = m.tasks.iter().filter(|(_, s)| s.skipped > 0).collect();
    if !skipped.is_empty() {
        writeln!(out)?;
        writeln!(out, "Skipped (no prior state)")?;
        for (task, stats) in skipped {
            writeln!(
                out,
                "  {:<32} {:>8} of {}",
                task.to_string(),
                stats.skipped,
                stats.skipped + stats.executed
            )?;
        }
    }

    if !m.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "Failures")?;
        for f in &m.failures {
            writeln!(out, "  {:>6}x {}  {}", f.occurrences, f.endpoint, f.message)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;
    use crate::harness::{
        EndpointReport, EndpointStats, FailureGroup, LatencyStats, MetricsSnapshot, TaskStats,
    };
    use crate::scenario::{Profile, TaskKind};
    use uuid::Uuid;

    #[test]
    fn test_summary_lists_endpoints_skips_and_failures() {
        let summary = RunSummary {
            run_id: Uuid::nil(),
            profile: Profile::LoadPatient,
            users_started: 2,
            metrics: MetricsSnapshot {
                elapsed: Duration::from_secs(65),
                endpoints: vec![EndpointReport {
                    endpoint: Endpoint::LoadPatient,
                    stats: EndpointStats {
                        requests: 10,
                        failures: 1,
                        expected_rejections: 2,
                    },
                    latency: LatencyStats {
                        count: 10,
                        ..Default::default()
                    },
                }],
                tasks: vec![(
                    TaskKind::LoadValidPatient,
                    TaskStats {
                        executed: 8,
                        skipped: 3,
                    },
                )],
                failures: vec![FailureGroup {
                    endpoint: Endpoint::LoadPatient,
                    message: "Code: 500 | Content: x | Task: LoadValidPatient".into(),
                    occurrences: 1,
                }],
            },
            patients_created: 0,
            tests_created: 0,
        };

        let mut buf = Vec::new();
        write_summary(&mut buf, &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("(load-patient)"));
        assert!(text.contains("Elapsed 00:01:05"));
        assert!(text.contains("GET patient/{id}"));
        assert!(text.contains("LoadValidPatient"));
        assert!(text.contains("3 of 11"));
        assert!(text.contains("Code: 500 | Content: x"));
    }
}
