// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Suite/case state machine
//!
//! [`LogParser`] folds classified console lines into the report model. It
//! keeps at most one open suite and one open case, checks that every case
//! and error line agrees with them, and hands each suite to a [`SuiteSink`]
//! as soon as its finish line arrives.
//!
//! | State   | Event          | Next    |
//! |---------|----------------|---------|
//! | Idle    | suite started  | InSuite |
//! | InSuite | case started   | InCase  |
//! | InCase  | case error     | InCase  |
//! | InCase  | case passed    | InSuite |
//! | InCase  | case failed    | InSuite |
//! | any     | suite finished | Idle    |
//!
//! Exit code and build-failed lines update the exit code in any state.
//!
//! # Example
//!
//! ```
//! use xctest_report::{LogParser, Suite};
//!
//! let mut parser = LogParser::new("localhost", Vec::<Suite>::new());
//! for line in [
//!     "Test Suite 'FooTests' started at 2020-01-01 00:00:00 GMT 0000",
//!     "Test Case '-[FooTests testBar]' started.",
//!     "Test Case '-[FooTests testBar]' passed (0.500 seconds).",
//!     "Test Suite 'FooTests' finished at 2020-01-01 00:00:05 GMT 0000.",
//! ] {
//!     parser.process_line(line).unwrap();
//! }
//! let (suites, summary) = parser.into_parts();
//! assert_eq!(suites[0].tests, 1);
//! assert_eq!(summary.exit_code, 0);
//! ```

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{DesyncError, ReportError};
use crate::matcher::{BUILD_FAILED_EXIT_CODE, LineEvent, classify};
use crate::model::{Case, CaseOutcome, Failure, RunSummary, Suite, SuiteSummary};
use crate::timestamp::parse_timestamp;

/// Receives every suite when its finish line is parsed
pub trait SuiteSink {
    /// Take ownership of a closed suite
    ///
    /// Returns the path of the written report, if any.
    ///
    /// # Errors
    ///
    /// Any error aborts the parse.
    fn suite_closed(&mut self, suite: Suite) -> Result<Option<PathBuf>, ReportError>;
}

/// Collects closed suites in memory
impl SuiteSink for Vec<Suite> {
    fn suite_closed(&mut self, suite: Suite) -> Result<Option<PathBuf>, ReportError> {
        self.push(suite);
        Ok(None)
    }
}

impl<S: SuiteSink + ?Sized> SuiteSink for &mut S {
    fn suite_closed(&mut self, suite: Suite) -> Result<Option<PathBuf>, ReportError> {
        (**self).suite_closed(suite)
    }
}

/// Which of the open suite/case slots are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No suite open
    Idle,
    /// Suite open, no case running
    InSuite,
    /// Suite open and a case running
    InCase,
}

/// Mutable state for one build log
#[derive(Debug, Default)]
pub struct ParserContext {
    current_suite: Option<Suite>,
    current_case: Option<Case>,
    exit_code: i32,
}

impl ParserContext {
    /// The open suite, if any
    #[must_use]
    pub fn current_suite(&self) -> Option<&Suite> {
        self.current_suite.as_ref()
    }

    /// The running case, if any
    #[must_use]
    pub fn current_case(&self) -> Option<&Case> {
        self.current_case.as_ref()
    }

    /// Exit code reported so far
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ParserState {
        match (&self.current_suite, &self.current_case) {
            (None, _) => ParserState::Idle,
            (Some(_), None) => ParserState::InSuite,
            (Some(_), Some(_)) => ParserState::InCase,
        }
    }
}

/// Streaming parser for xcodebuild console output
pub struct LogParser<S> {
    host: String,
    sink: S,
    context: ParserContext,
    closed: Vec<SuiteSummary>,
}

impl<S: SuiteSink> LogParser<S> {
    /// Create a parser that reports suites run on `host` to `sink`
    #[must_use]
    pub fn new(host: impl Into<String>, sink: S) -> Self {
        Self {
            host: host.into(),
            sink,
            context: ParserContext::default(),
            closed: Vec::new(),
        }
    }

    /// Current suite/case context
    #[must_use]
    pub fn context(&self) -> &ParserContext {
        &self.context
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.context.state()
    }

    /// Exit code reported so far
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.context.exit_code
    }

    /// The sink suites are handed to
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Summaries of the suites closed so far
    #[must_use]
    pub fn closed_suites(&self) -> &[SuiteSummary] {
        &self.closed
    }

    /// Process a single line of output, without its line terminator
    ///
    /// Returns the summary of the suite closed by this line, if any.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::OutOfSync` when the line contradicts the open
    /// suite/case, `ReportError::InvalidTimestamp` for malformed suite times,
    /// and whatever the sink returns when a suite is written.
    pub fn process_line(&mut self, line: &str) -> Result<Option<SuiteSummary>, ReportError> {
        match classify(line) {
            Some(event) => self.apply(event),
            None => Ok(None),
        }
    }

    /// Apply an already classified event
    ///
    /// # Errors
    ///
    /// See [`LogParser::process_line`].
    pub fn apply(&mut self, event: LineEvent) -> Result<Option<SuiteSummary>, ReportError> {
        debug!(event = event.kind(), state = ?self.state(), "applying event");
        match event {
            LineEvent::SuiteStarted { name, timestamp } => {
                self.start_suite(name, &timestamp)?;
                Ok(None)
            }
            LineEvent::SuiteFinished { name, timestamp } => self.finish_suite(&name, &timestamp),
            LineEvent::CaseStarted { name, .. } => {
                self.start_case(name)?;
                Ok(None)
            }
            LineEvent::CasePassed { name, seconds } => {
                self.finish_case(&name, CaseOutcome::Passed, seconds)?;
                Ok(None)
            }
            LineEvent::CaseFailed { name, seconds } => {
                self.finish_case(&name, CaseOutcome::Failed, seconds)?;
                Ok(None)
            }
            LineEvent::CaseError {
                location,
                suite,
                name,
                message,
            } => {
                self.record_failure(&suite, &name, Failure::new(message, location))?;
                Ok(None)
            }
            LineEvent::ExitCode(code) => {
                debug!(code, "tool reported exit code");
                self.context.exit_code = code;
                Ok(None)
            }
            LineEvent::BuildFailed => {
                self.context.exit_code = BUILD_FAILED_EXIT_CODE;
                Ok(None)
            }
        }
    }

    fn start_suite(&mut self, name: String, timestamp: &str) -> Result<(), ReportError> {
        if let Some(current) = &self.context.current_suite {
            // An empty open suite is an aggregate ('All tests', 'Foo.xctest')
            // whose members report individually.
            if self.context.current_case.is_some() || !current.cases.is_empty() {
                return Err(DesyncError::SuiteAlreadyOpen {
                    current: current.name.clone(),
                    started: name,
                }
                .into());
            }
            debug!(container = %current.name, suite = %name, "replacing empty container suite");
        }

        let start_time = parse_timestamp(timestamp)?;
        debug!(suite = %name, %start_time, "suite started");
        self.context.current_suite = Some(Suite::new(self.host.clone(), name, start_time));
        Ok(())
    }

    fn finish_suite(
        &mut self,
        name: &str,
        timestamp: &str,
    ) -> Result<Option<SuiteSummary>, ReportError> {
        if self.context.current_suite.is_none() {
            debug!(suite = name, "finish line with no open suite, ignoring");
            return Ok(None);
        }
        let end_time = parse_timestamp(timestamp)?;

        if let Some(case) = self.context.current_case.take() {
            warn!(case = %case.name, "suite finished while a case was running; dropping the case");
        }
        let Some(mut suite) = self.context.current_suite.take() else {
            return Ok(None);
        };
        if suite.name != name {
            warn!(open = %suite.name, finished = name, "finish line names a different suite");
        }

        suite.close(end_time);
        let mut summary = SuiteSummary::new(&suite, None);
        summary.report = self.sink.suite_closed(suite)?;
        info!(
            suite = %summary.name,
            tests = summary.tests,
            failures = summary.failures,
            "suite finished"
        );
        self.closed.push(summary.clone());
        Ok(Some(summary))
    }

    fn start_case(&mut self, name: String) -> Result<(), DesyncError> {
        let suite = self
            .context
            .current_suite
            .as_ref()
            .ok_or(DesyncError::NoSuite)?;
        if let Some(current) = &self.context.current_case {
            return Err(DesyncError::CaseAlreadyOpen {
                current: current.name.clone(),
                started: name,
            });
        }
        self.context.current_case = Some(Case::new(suite.name.clone(), name));
        Ok(())
    }

    fn finish_case(
        &mut self,
        name: &str,
        outcome: CaseOutcome,
        seconds: f64,
    ) -> Result<(), DesyncError> {
        check_suite(self.context.current_suite.as_ref(), None)?;
        check_case(self.context.current_case.as_ref(), name)?;

        if let (Some(suite), Some(mut case)) = (
            self.context.current_suite.as_mut(),
            self.context.current_case.take(),
        ) {
            case.finish(outcome, seconds);
            debug!(suite = %suite.name, case = %case.name, ?outcome, seconds, "case finished");
            suite.record_case(case);
        }
        Ok(())
    }

    fn record_failure(
        &mut self,
        suite: &str,
        name: &str,
        failure: Failure,
    ) -> Result<(), DesyncError> {
        check_suite(self.context.current_suite.as_ref(), Some(suite))?;
        check_case(self.context.current_case.as_ref(), name)?;

        if let Some(case) = self.context.current_case.as_mut() {
            debug!(case = %case.name, location = %failure.location, "failure recorded");
            case.add_failure(failure);
        }
        Ok(())
    }

    /// Finish parsing and summarize the run
    #[must_use]
    pub fn finish(self) -> RunSummary {
        self.into_parts().1
    }

    /// Finish parsing, returning the sink and the run summary
    #[must_use]
    pub fn into_parts(self) -> (S, RunSummary) {
        if let Some(case) = &self.context.current_case {
            warn!(case = %case.name, "log ended while a case was running");
        }
        let unterminated_suite = self.context.current_suite.map(|suite| {
            warn!(suite = %suite.name, "log ended before the suite finished; no report written");
            suite.name
        });

        let summary = RunSummary {
            exit_code: self.context.exit_code,
            suites: self.closed,
            unterminated_suite,
        };
        (self.sink, summary)
    }
}

fn check_suite(suite: Option<&Suite>, name: Option<&str>) -> Result<(), DesyncError> {
    match (suite, name) {
        (None, _) => Err(DesyncError::NoSuite),
        (Some(suite), Some(name)) if suite.name != name => Err(DesyncError::SuiteMismatch {
            current: suite.name.clone(),
            expected: name.to_string(),
        }),
        (Some(_), _) => Ok(()),
    }
}

fn check_case(case: Option<&Case>, name: &str) -> Result<(), DesyncError> {
    match case {
        None => Err(DesyncError::NoCase),
        Some(case) if case.name != name => Err(DesyncError::CaseMismatch {
            current: case.name.clone(),
            expected: name.to_string(),
        }),
        Some(_) => Ok(()),
    }
}
