// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for xctest-report

use thiserror::Error;

/// Errors that abort processing of a build log
#[derive(Debug, Error)]
pub enum ReportError {
    /// The log no longer agrees with the open suite/case context
    #[error(transparent)]
    OutOfSync(#[from] DesyncError),

    /// A suite start/finish line carried a timestamp that could not be parsed
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The raw timestamp text
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Error creating the reports directory or writing a report
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing a report
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// A mismatch between the open suite/case and the event being applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesyncError {
    /// An event needed an open suite but none was open
    #[error("Log statements out of sync: current test suite was null")]
    NoSuite,

    /// An event named a different suite than the open one
    #[error("Log statements out of sync: current test suite was '{current}' and not '{expected}'")]
    SuiteMismatch {
        /// Name of the open suite
        current: String,
        /// Name carried by the event
        expected: String,
    },

    /// An event needed an open case but none was open
    #[error("Log statements out of sync: current test case was null")]
    NoCase,

    /// An event named a different case than the open one
    #[error("Log statements out of sync: current test case was '{current}' and not '{expected}'")]
    CaseMismatch {
        /// Name of the open case
        current: String,
        /// Name carried by the event
        expected: String,
    },

    /// A case started before the open one finished
    #[error("Log statements out of sync: test case '{started}' started while '{current}' was still running")]
    CaseAlreadyOpen {
        /// Name of the open case
        current: String,
        /// Name of the case that started
        started: String,
    },

    /// A suite started while a suite with recorded cases was still open
    #[error("Log statements out of sync: test suite '{started}' started while '{current}' was still running")]
    SuiteAlreadyOpen {
        /// Name of the open suite
        current: String,
        /// Name of the suite that started
        started: String,
    },
}

impl ReportError {
    /// Whether this error is a desynchronization between log and parser state
    #[must_use]
    pub fn is_out_of_sync(&self) -> bool {
        matches!(self, Self::OutOfSync(_))
    }
}
