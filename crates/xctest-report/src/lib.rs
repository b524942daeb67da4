// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! xctest-report: JUnit reports from xcodebuild test output
//!
//! This library crate turns the console output of `xcodebuild test` into one
//! JUnit XML report per test suite, while the output is still being produced.
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//! use xctest_report::{LogParser, ReportWriter, StreamAdapter};
//!
//! let writer = ReportWriter::new(".").unwrap();
//! let parser = LogParser::new("localhost", writer);
//! let mut adapter = StreamAdapter::new(std::io::stdout(), parser);
//!
//! adapter
//!     .write_all(b"Test Suite 'FooTests' started at 2020-01-01 00:00:00 GMT 0000\n")
//!     .unwrap();
//! let (_, _, summary) = adapter.finish().unwrap();
//! println!("exit code {}", summary.exit_code);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod stream;
pub mod timestamp;
pub mod writer;

pub use error::{DesyncError, ReportError};
pub use matcher::{LineEvent, classify};
pub use model::{Case, CaseOutcome, Failure, FailureKind, RunSummary, Suite, SuiteSummary};
pub use parser::{LogParser, ParserContext, ParserState, SuiteSink};
pub use stream::StreamAdapter;
pub use writer::{REPORTS_DIR, ReportWriter};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{DesyncError, ReportError};
    pub use crate::model::{RunSummary, Suite};
    pub use crate::parser::{LogParser, SuiteSink};
    pub use crate::stream::StreamAdapter;
    pub use crate::writer::ReportWriter;
}
