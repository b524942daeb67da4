//! Report model types
//!
//! A [`Suite`] owns its [`Case`]s, a case owns its [`Failure`]s. Nothing here
//! validates ordering; that is the job of [`crate::parser::LogParser`].

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Message prefix XCTest uses for uncaught exceptions
const CAUGHT_EXCEPTION_PREFIX: &str = "failed: caught";

/// Classification of a recorded failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Assertion failure
    #[default]
    Failure,
    /// Error reported by the tool itself (e.g. an uncaught exception)
    Error,
}

impl FailureKind {
    /// Classify a failure from its message text
    #[must_use]
    pub fn classify(message: &str) -> Self {
        if message.trim_start().starts_with(CAUGHT_EXCEPTION_PREFIX) {
            Self::Error
        } else {
            Self::Failure
        }
    }

    /// Value of the `type` attribute in a JUnit report
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Failure => "Failure",
            Self::Error => "Error",
        }
    }
}

/// A failure recorded against a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure message
    pub message: String,
    /// Source location, usually `file:line`
    pub location: String,
    /// Failure classification
    pub kind: FailureKind,
}

impl Failure {
    /// Create a failure, classifying it from the message
    #[must_use]
    pub fn new(message: impl Into<String>, location: impl Into<String>) -> Self {
        let message = message.into();
        let kind = FailureKind::classify(&message);
        Self {
            message,
            location: location.into(),
            kind,
        }
    }
}

/// How a test case finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
}

/// A single test method execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Name of the suite the case ran in
    pub suite_name: String,
    /// Test method name
    pub name: String,
    /// Elapsed time reported on the pass/fail line
    pub elapsed_seconds: f64,
    /// Outcome, `None` while the case is still running
    pub outcome: Option<CaseOutcome>,
    /// Failures recorded while the case ran
    pub failures: Vec<Failure>,
}

impl Case {
    /// Create a running case
    #[must_use]
    pub fn new(suite_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            name: name.into(),
            elapsed_seconds: 0.0,
            outcome: None,
            failures: Vec::new(),
        }
    }

    /// Attach a failure
    pub fn add_failure(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Record how the case finished
    pub fn finish(&mut self, outcome: CaseOutcome, elapsed_seconds: f64) {
        self.outcome = Some(outcome);
        self.elapsed_seconds = elapsed_seconds;
    }

    /// Check if the case finished as failed
    #[must_use]
    pub fn failed(&self) -> bool {
        self.outcome == Some(CaseOutcome::Failed)
    }
}

/// A named group of test cases with a start/end time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    /// Host the tests ran on
    pub host: String,
    /// Suite name
    pub name: String,
    /// Time the suite started
    pub start_time: DateTime<FixedOffset>,
    /// Time the suite finished, set once when it closes
    pub end_time: Option<DateTime<FixedOffset>>,
    /// Number of finished cases
    pub tests: usize,
    /// Number of cases that finished as failed
    pub failures: usize,
    /// Number of cases counted as errors
    ///
    /// No console event increments this, so parsed suites always report 0.
    /// Uncaught exceptions only change a failure's kind to
    /// [`FailureKind::Error`].
    pub errors: usize,
    /// Finished cases in the order they finished
    pub cases: Vec<Case>,
}

impl Suite {
    /// Create an open suite
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        name: impl Into<String>,
        start_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            host: host.into(),
            name: name.into(),
            start_time,
            end_time: None,
            tests: 0,
            failures: 0,
            errors: 0,
            cases: Vec::new(),
        }
    }

    /// Append a finished case and update the counters
    pub fn record_case(&mut self, case: Case) {
        self.tests += 1;
        if case.failed() {
            self.failures += 1;
        }
        self.cases.push(case);
    }

    /// Close the suite at `end_time`
    pub fn close(&mut self, end_time: DateTime<FixedOffset>) {
        debug_assert!(self.end_time.is_none(), "suite closed twice");
        self.end_time = Some(end_time);
    }

    /// Check if the suite has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Seconds between start and end, `None` while the suite is open
    #[must_use]
    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 1000.0)
    }
}

/// Counters for one closed suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    /// Suite name
    pub name: String,
    /// Number of cases
    pub tests: usize,
    /// Number of failed cases
    pub failures: usize,
    /// Number of error cases
    pub errors: usize,
    /// Suite duration in seconds
    pub time: f64,
    /// Where the report was written, if it was written to disk
    pub report: Option<PathBuf>,
}

impl SuiteSummary {
    /// Summarize a closed suite
    #[must_use]
    pub fn new(suite: &Suite, report: Option<PathBuf>) -> Self {
        Self {
            name: suite.name.clone(),
            tests: suite.tests,
            failures: suite.failures,
            errors: suite.errors,
            time: suite.elapsed_seconds().unwrap_or(0.0),
            report,
        }
    }
}

/// Result of processing a whole build log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Exit status reported by the tool, 0 when none was seen
    pub exit_code: i32,
    /// Closed suites in the order they closed
    pub suites: Vec<SuiteSummary>,
    /// Suite still open when the log ended; it is never written
    pub unterminated_suite: Option<String>,
}

impl RunSummary {
    /// Total cases across all closed suites
    #[must_use]
    pub fn total_tests(&self) -> usize {
        self.suites.iter().map(|s| s.tests).sum()
    }

    /// Total failed cases across all closed suites
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.suites.iter().map(|s| s.failures).sum()
    }

    /// Check if the tool reported success
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
