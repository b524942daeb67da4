// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line classification
//!
//! Each console line is tried against a fixed, ordered list of patterns and
//! the first one that matches produces a [`LineEvent`]. Matching is purely
//! textual: whether an event makes sense in the current suite/case context is
//! decided later by [`crate::parser::LogParser`].
//!
//! # Example
//!
//! ```
//! use xctest_report::matcher::{LineEvent, classify};
//!
//! let event = classify("Test Case '-[FooTests testBar]' started.");
//! assert_eq!(
//!     event,
//!     Some(LineEvent::CaseStarted {
//!         class: "FooTests".to_string(),
//!         name: "testBar".to_string(),
//!     })
//! );
//! assert_eq!(classify("CompileC Foo.o Foo.m normal x86_64"), None);
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

/// Exit code recorded for a `BUILD FAILED` marker line
pub const BUILD_FAILED_EXIT_CODE: i32 = -1;

/// A recognised console line
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    /// `Test Suite '<name>' started at <timestamp>`
    SuiteStarted {
        /// Suite name
        name: String,
        /// Raw timestamp text
        timestamp: String,
    },
    /// `Test Suite '<name>' finished at <timestamp>.`
    SuiteFinished {
        /// Suite name
        name: String,
        /// Raw timestamp text
        timestamp: String,
    },
    /// `Test Case '-[<class> <method>]' started.`
    CaseStarted {
        /// Test class
        class: String,
        /// Test method
        name: String,
    },
    /// `Test Case '-[<class> <method>]' passed (<seconds> seconds).`
    CasePassed {
        /// Test method
        name: String,
        /// Reported duration
        seconds: f64,
    },
    /// `<file:line>: error: -[<class> <method>] : <message>`
    CaseError {
        /// Source location of the failure
        location: String,
        /// Test class, expected to match the open suite
        suite: String,
        /// Test method, expected to match the open case
        name: String,
        /// Failure message
        message: String,
    },
    /// `Test Case '-[<class> <method>]' failed (<seconds> seconds).`
    CaseFailed {
        /// Test method
        name: String,
        /// Reported duration
        seconds: f64,
    },
    /// `... failed with exit code <n>`
    ExitCode(i32),
    /// `BUILD FAILED`
    BuildFailed,
}

impl LineEvent {
    /// Short label used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SuiteStarted { .. } => "suite-started",
            Self::SuiteFinished { .. } => "suite-finished",
            Self::CaseStarted { .. } => "case-started",
            Self::CasePassed { .. } => "case-passed",
            Self::CaseError { .. } => "case-error",
            Self::CaseFailed { .. } => "case-failed",
            Self::ExitCode(_) => "exit-code",
            Self::BuildFailed => "build-failed",
        }
    }
}

type Extract = fn(&Captures<'_>) -> Option<LineEvent>;

struct Rule {
    name: &'static str,
    pattern: Regex,
    extract: Extract,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, extract: Extract) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("line pattern must compile"),
            extract,
        }
    }
}

/// Patterns in priority order; the first match wins.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "suite-started",
            r"^Test Suite '(?P<name>[^']+)'.*started at\s+(?P<time>.+)$",
            |c| {
                suite_name(&c["name"]).map(|name| LineEvent::SuiteStarted {
                    name,
                    timestamp: c["time"].to_string(),
                })
            },
        ),
        Rule::new(
            "suite-finished",
            r"^Test Suite '(?P<name>[^']+)'.*(?:finished|passed|failed) at\s+(?P<time>.+?)\.?$",
            |c| {
                suite_name(&c["name"]).map(|name| LineEvent::SuiteFinished {
                    name,
                    timestamp: c["time"].to_string(),
                })
            },
        ),
        Rule::new(
            "case-started",
            r"^Test Case '-\[(?P<class>\S+)\s+(?P<name>\S+)\]' started\.?$",
            |c| {
                Some(LineEvent::CaseStarted {
                    class: c["class"].to_string(),
                    name: c["name"].to_string(),
                })
            },
        ),
        Rule::new(
            "case-passed",
            r"^Test Case '-\[\S+\s+(?P<name>\S+)\]' passed \((?P<secs>\d+(?:\.\d+)?) seconds\)\.?$",
            |c| {
                Some(LineEvent::CasePassed {
                    name: c["name"].to_string(),
                    seconds: c["secs"].parse().ok()?,
                })
            },
        ),
        Rule::new(
            "case-error",
            r"^(?P<location>.*): error: -\[(?P<class>\S+) (?P<name>\S+)\] : (?P<message>.*)$",
            |c| {
                Some(LineEvent::CaseError {
                    location: c["location"].to_string(),
                    suite: c["class"].to_string(),
                    name: c["name"].to_string(),
                    message: c["message"].to_string(),
                })
            },
        ),
        Rule::new(
            "case-failed",
            r"^Test Case '-\[\S+\s+(?P<name>\S+)\]' failed \((?P<secs>\d+(?:\.\d+)?) seconds\)\.?$",
            |c| {
                Some(LineEvent::CaseFailed {
                    name: c["name"].to_string(),
                    seconds: c["secs"].parse().ok()?,
                })
            },
        ),
        Rule::new(
            "exit-code",
            r"failed with exit code (?P<code>\d+)\s*$",
            |c| c["code"].parse().ok().map(LineEvent::ExitCode),
        ),
        Rule::new(
            "build-failed",
            r"^(?:\*\* )?BUILD FAILED(?: \*\*)?$",
            |_| Some(LineEvent::BuildFailed),
        ),
    ]
});

/// A suite name that is really a bundle path marks a container line, not a
/// suite boundary.
fn suite_name(name: &str) -> Option<String> {
    if name.contains(['/', '\\']) {
        None
    } else {
        Some(name.to_string())
    }
}

/// Classify one line of console output
///
/// A trailing carriage return is ignored. Returns `None` for lines that
/// match no pattern.
#[must_use]
pub fn classify(line: &str) -> Option<LineEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    RULES.iter().find_map(|rule| {
        let captures = rule.pattern.captures(line)?;
        let event = (rule.extract)(&captures);
        if event.is_none() {
            trace!(rule = rule.name, line, "pattern matched but fields were rejected");
        }
        event
    })
}
