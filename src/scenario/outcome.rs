//! Classification of responses into success and failure.

use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

use super::TaskKind;
use crate::api::{ApiResponse, ClientError, Endpoint};

/// Which side of a resource's traffic mix a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Well-formed input, normal success status expected.
    Valid,
    /// Deliberately malformed input, a 4xx is expected and counts as success.
    Invalid,
}

/// Diagnostics for a request whose outcome did not match its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub task: TaskKind,
    /// `None` when no response was received.
    pub status: Option<u16>,
    pub content: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "Code: {code}")?,
            None => write!(f, "Code: none")?,
        }
        write!(f, " | Content: {} | Task: {}", self.content, self.task)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(Failure),
}

/// One request issued by a task, with its classification.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub task: TaskKind,
    pub endpoint: Endpoint,
    pub branch: Branch,
    pub elapsed: Duration,
    pub verdict: Verdict,
}

impl RequestRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.verdict, Verdict::Success)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.verdict {
            Verdict::Failure(failure) => Some(failure),
            Verdict::Success => None,
        }
    }

    /// Rejected input that the API correctly refused.
    pub fn is_expected_rejection(&self) -> bool {
        self.branch == Branch::Invalid && self.is_success()
    }

    pub(crate) fn fail(mut self, status: Option<StatusCode>, content: impl Into<String>) -> Self {
        self.verdict = Verdict::Failure(Failure {
            task: self.task,
            status: status.map(|s| s.as_u16()),
            content: content.into(),
        });
        self
    }
}

#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Required state was not available yet, no request was made.
    Skipped,
    Completed(Vec<RequestRecord>),
}

impl TaskOutcome {
    pub fn completed(record: RequestRecord) -> Self {
        TaskOutcome::Completed(vec![record])
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskOutcome::Skipped)
    }

    pub fn requests(&self) -> &[RequestRecord] {
        match self {
            TaskOutcome::Skipped => &[],
            TaskOutcome::Completed(records) => records,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.requests().iter().filter_map(RequestRecord::failure)
    }
}

/// Status a request must come back with to count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub status: StatusCode,
    pub branch: Branch,
}

impl Expectation {
    pub const fn valid(status: StatusCode) -> Self {
        Self {
            status,
            branch: Branch::Valid,
        }
    }

    pub const fn invalid(status: StatusCode) -> Self {
        Self {
            status,
            branch: Branch::Invalid,
        }
    }

    pub fn classify(
        &self,
        task: TaskKind,
        endpoint: Endpoint,
        result: &Result<ApiResponse, ClientError>,
    ) -> RequestRecord {
        let record = RequestRecord {
            task,
            endpoint,
            branch: self.branch,
            elapsed: Duration::ZERO,
            verdict: Verdict::Success,
        };
        match result {
            Ok(response) => {
                let record = RequestRecord {
                    elapsed: response.elapsed,
                    ..record
                };
                if response.status == self.status {
                    record
                } else {
                    record.fail(Some(response.status), response.body.clone())
                }
            }
            Err(err) => {
                let record = RequestRecord {
                    elapsed: err.elapsed().unwrap_or_default(),
                    ..record
                };
                record.fail(None, err.to_string())
            }
        }
    }
}
