// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Byte stream adapter
//!
//! [`StreamAdapter`] sits between a build tool's output and the live log.
//! Every byte is relayed unchanged to the pass-through sink; complete lines
//! are also fed to a [`LogParser`]. Only `\n` terminates a line.

use std::io::{self, Write};

use tracing::{debug, error};

use crate::error::ReportError;
use crate::model::RunSummary;
use crate::parser::{LogParser, SuiteSink};

/// Splits a byte stream into lines for a [`LogParser`] while echoing it
pub struct StreamAdapter<W, S> {
    passthrough: W,
    parser: LogParser<S>,
    pending: Vec<u8>,
    aborted: bool,
}

impl<W: Write, S: SuiteSink> StreamAdapter<W, S> {
    /// Create an adapter relaying bytes to `passthrough`
    #[must_use]
    pub fn new(passthrough: W, parser: LogParser<S>) -> Self {
        Self {
            passthrough,
            parser,
            pending: Vec::new(),
            aborted: false,
        }
    }

    /// The parser lines are fed to
    #[must_use]
    pub fn parser(&self) -> &LogParser<S> {
        &self.parser
    }

    /// Whether a parse error stopped line processing
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Feed a chunk of output
    ///
    /// After the first parse error, bytes are still relayed but no further
    /// lines are parsed.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the pass-through sink fails, or the
    /// first error raised by the parser.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), ReportError> {
        self.passthrough.write_all(bytes)?;
        if self.aborted {
            return Ok(());
        }

        let mut rest = bytes;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            self.pending.extend_from_slice(&rest[..pos]);
            rest = &rest[pos + 1..];
            let line = std::mem::take(&mut self.pending);
            self.process(&line)?;
        }
        self.pending.extend_from_slice(rest);
        Ok(())
    }

    fn process(&mut self, line: &[u8]) -> Result<(), ReportError> {
        let text = String::from_utf8_lossy(line);
        if let Err(e) = self.parser.process_line(&text) {
            error!(error = %e, line = %text, "stopped parsing build output");
            self.aborted = true;
            self.pending.clear();
            return Err(e);
        }
        Ok(())
    }

    /// End of stream: parse any unterminated last line and summarize the run
    ///
    /// Returns the pass-through sink, the suite sink and the run summary.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if flushing the pass-through sink fails, or
    /// the parser's error for the last line.
    pub fn finish(mut self) -> Result<(W, S, RunSummary), ReportError> {
        self.passthrough.flush()?;
        if !self.aborted && !self.pending.is_empty() {
            debug!(bytes = self.pending.len(), "processing unterminated last line");
            let line = std::mem::take(&mut self.pending);
            self.process(&line)?;
        }
        let (sink, summary) = self.parser.into_parts();
        Ok((self.passthrough, sink, summary))
    }
}

impl<W: Write, S: SuiteSink> Write for StreamAdapter<W, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf).map_err(|e| match e {
            ReportError::Io(e) => e,
            other => io::Error::other(other),
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.passthrough.flush()
    }
}
