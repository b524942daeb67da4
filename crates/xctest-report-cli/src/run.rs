// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The stdin-to-stdout pipeline
//!
//! Build output is copied to the pass-through writer as it arrives while a
//! [`StreamAdapter`] turns it into reports. A parse error stops report
//! generation but not the copy, so the live log stays complete.

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use xctest_report::{LogParser, REPORTS_DIR, ReportError, ReportWriter, RunSummary, StreamAdapter};

use crate::config::Config;

/// Exit status for a parse or I/O failure
pub const FATAL_EXIT_STATUS: u8 = 2;

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Relay `input` to `output`, writing reports and returning the run summary
///
/// # Errors
///
/// Returns an error if the workspace cannot be prepared, reading or relaying
/// the output fails, a report cannot be written, or the log falls out of
/// sync with the parser.
pub fn run<R: Read, W: Write>(config: &Config, mut input: R, output: W) -> Result<RunSummary> {
    let workspace = config
        .workspace_path()
        .context("cannot determine the workspace directory")?;
    let reports = workspace.join(REPORTS_DIR);

    if config.clean && reports.exists() {
        fs::remove_dir_all(&reports)
            .with_context(|| format!("failed to clean {}", reports.display()))?;
        info!(dir = %reports.display(), "removed previous reports");
    }

    let writer = ReportWriter::new(&workspace)
        .with_context(|| format!("failed to create {}", reports.display()))?;
    let hostname = config.hostname();
    debug!(%hostname, workspace = %workspace.display(), "parsing build output");

    let mut adapter = StreamAdapter::new(output, LogParser::new(hostname, writer));
    let mut parse_error: Option<ReportError> = None;
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("failed to read build output"),
        };
        if let Err(e) = adapter.feed(&buf[..n]) {
            if !adapter.is_aborted() || parse_error.is_some() {
                return Err(e).context("failed to relay build output");
            }
            warn!("report generation stopped; relaying the rest of the output");
            parse_error = Some(e);
        }
    }

    let summary = match adapter.finish() {
        Ok((_, _, summary)) => summary,
        Err(e) => return Err(parse_error.unwrap_or(e)).context("failed to parse build output"),
    };
    if let Some(e) = parse_error {
        return Err(e).context("failed to parse build output");
    }

    if let Some(path) = &config.summary {
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        debug!(path = %path.display(), "summary written");
    }

    info!(
        suites = summary.suites.len(),
        tests = summary.total_tests(),
        failures = summary.total_failures(),
        exit_code = summary.exit_code,
        "build output processed"
    );
    Ok(summary)
}

/// Process exit status for a completed run
///
/// Zero when the tool reported success, otherwise the reported code clamped
/// into `1..=255`.
#[must_use]
pub fn exit_status(summary: &RunSummary) -> u8 {
    match summary.exit_code {
        0 => 0,
        code => u8::try_from(code.clamp(1, 255)).unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use similar_asserts::assert_eq;

    fn summary(exit_code: i32) -> RunSummary {
        RunSummary {
            exit_code,
            suites: Vec::new(),
            unterminated_suite: None,
        }
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&summary(0)), 0);
        assert_eq!(exit_status(&summary(65)), 65);
        assert_eq!(exit_status(&summary(-1)), 1);
        assert_eq!(exit_status(&summary(300)), 255);
    }

    /// A reader that fails after the first read
    struct FailingReader(bool);

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if std::mem::replace(&mut self.0, true) {
                return Err(io::Error::other("pipe closed"));
            }
            let line = b"building\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn test_read_failure_is_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = Config {
            workspace: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut out = Vec::new();
        let err = run(&config, FailingReader(false), &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("pipe closed"));
        assert_eq!(out, b"building\n".to_vec());
    }

    proptest! {
        #[test]
        fn prop_exit_status_nonzero_for_failures(code in any::<i32>()) {
            let status = exit_status(&summary(code));
            prop_assert_eq!(status == 0, code == 0);
        }
    }
}
