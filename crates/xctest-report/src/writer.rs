// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! JUnit XML report writing
//!
//! One document per suite, written to `<workspace>/test-reports/TEST-<suite>.xml`:
//!
//! ```xml
//! <testsuite name="..." hostname="..." tests="N" failures="N" errors="N" time="S.ss" timestamp="...">
//!   <testcase classname="..." name="..." time="S.ss">
//!     <failure message="..." type="Failure">location text</failure>
//!   </testcase>
//! </testsuite>
//! ```

use std::borrow::Cow;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::ReportError;
use crate::model::{Case, Suite};
use crate::parser::SuiteSink;

/// Directory under the workspace that receives reports
pub const REPORTS_DIR: &str = "test-reports";

/// Writes one JUnit report per closed suite
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer for `<workspace>/test-reports`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the directory cannot be created.
    pub fn new(workspace: impl AsRef<Path>) -> Result<Self, ReportError> {
        Self::in_dir(workspace.as_ref().join(REPORTS_DIR))
    }

    /// Create a writer for an explicit reports directory
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the directory cannot be created.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "reports directory ready");
        Ok(Self { dir })
    }

    /// The reports directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the report for a suite
    #[must_use]
    pub fn report_path(&self, suite_name: &str) -> PathBuf {
        self.dir.join(format!("TEST-{suite_name}.xml"))
    }

    /// Write the report for a suite
    ///
    /// The document is written to a temporary file in the reports directory
    /// and renamed into place, so a failed write leaves no report behind.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` or `ReportError::Xml` if writing fails.
    pub fn write(&self, suite: &Suite) -> Result<PathBuf, ReportError> {
        let path = self.report_path(&suite.name);
        let mut file = NamedTempFile::new_in(&self.dir)?;
        write_xml(suite, BufWriter::new(file.as_file_mut()))?;
        file.persist(&path).map_err(|e| e.error)?;

        info!(suite = %suite.name, path = %path.display(), "report written");
        Ok(path)
    }
}

impl SuiteSink for ReportWriter {
    fn suite_closed(&mut self, suite: Suite) -> Result<Option<PathBuf>, ReportError> {
        self.write(&suite).map(Some)
    }
}

/// Render a suite report to a string
///
/// # Errors
///
/// Returns `ReportError::Xml` if serialization fails.
pub fn render(suite: &Suite) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_xml(suite, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| ReportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Serialize a suite report into `out`
///
/// # Errors
///
/// Returns `ReportError::Io` or `ReportError::Xml` if writing fails.
pub fn write_xml<W: Write>(suite: &Suite, out: W) -> Result<(), ReportError> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let tests = suite.tests.to_string();
    let failures = suite.failures.to_string();
    let errors = suite.errors.to_string();
    let time = format!("{:.2}", suite.elapsed_seconds().unwrap_or(0.0));
    let timestamp = suite
        .end_time
        .unwrap_or(suite.start_time)
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut root = BytesStart::new("testsuite");
    root.push_attribute(("name", &*xml_safe(&suite.name)));
    root.push_attribute(("hostname", &*xml_safe(&suite.host)));
    root.push_attribute(("tests", tests.as_str()));
    root.push_attribute(("failures", failures.as_str()));
    root.push_attribute(("errors", errors.as_str()));
    root.push_attribute(("time", time.as_str()));
    root.push_attribute(("timestamp", timestamp.as_str()));
    writer.write_event(Event::Start(root))?;

    for case in &suite.cases {
        write_case(&mut writer, case)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;

    let mut out = writer.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn write_case<W: Write>(writer: &mut Writer<W>, case: &Case) -> Result<(), ReportError> {
    let time = case.elapsed_seconds.to_string();
    let mut element = BytesStart::new("testcase");
    element.push_attribute(("classname", &*xml_safe(&case.suite_name)));
    element.push_attribute(("name", &*xml_safe(&case.name)));
    element.push_attribute(("time", time.as_str()));

    if case.failures.is_empty() {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }

    writer.write_event(Event::Start(element))?;
    for failure in &case.failures {
        let mut failure_element = BytesStart::new("failure");
        failure_element.push_attribute(("message", &*xml_safe(&failure.message)));
        failure_element.push_attribute(("type", failure.kind.as_str()));
        writer.write_event(Event::Start(failure_element))?;
        writer.write_event(Event::Text(BytesText::new(&xml_safe(&failure.location))))?;
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Drop characters XML 1.0 cannot represent (terminal escapes and the like)
fn xml_safe(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    }

    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| allowed(*c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaseOutcome, Failure};
    use chrono::{DateTime, FixedOffset, TimeZone};
    use similar_asserts::assert_eq;

    fn at(secs: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .and_then(|tz| tz.with_ymd_and_hms(2020, 1, 1, 0, 0, secs).single())
            .expect("valid time")
    }

    fn sample_suite() -> Suite {
        let mut suite = Suite::new("buildhost", "FooTests", at(0));
        let mut passed = Case::new("FooTests", "testBar");
        passed.finish(CaseOutcome::Passed, 0.5);
        suite.record_case(passed);

        let mut failed = Case::new("FooTests", "testBaz");
        failed.add_failure(Failure::new("\"a < b\" && 'c' > d", "/src/Foo.m:21"));
        failed.finish(CaseOutcome::Failed, 1.25);
        suite.record_case(failed);

        suite.close(at(5));
        suite
    }

    #[test]
    fn test_render_suite() {
        let xml = render(&sample_suite()).expect("Should render");
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="FooTests" hostname="buildhost" tests="2" failures="1" errors="0" time="5.00" timestamp="2020-01-01T00:00:05Z">
  <testcase classname="FooTests" name="testBar" time="0.5"/>
  <testcase classname="FooTests" name="testBaz" time="1.25">
    <failure message="&quot;a &lt; b&quot; &amp;&amp; &apos;c&apos; &gt; d" type="Failure">/src/Foo.m:21</failure>
  </testcase>
</testsuite>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_render_escapes_location_text() {
        let mut suite = Suite::new("host", "FooTests", at(0));
        let mut case = Case::new("FooTests", "testBar");
        case.add_failure(Failure::new("boom\u{1b}[31m", "<generated> & friends:1"));
        case.finish(CaseOutcome::Failed, 0.0);
        suite.record_case(case);
        suite.close(at(1));

        let xml = render(&suite).expect("Should render");
        assert!(xml.contains(">&lt;generated&gt; &amp; friends:1</failure>"));
        assert!(xml.contains("message=\"boom[31m\""));
    }

    #[test]
    fn test_write_creates_named_report() {
        let workspace = tempfile::tempdir().expect("create temp dir");
        let writer = ReportWriter::new(workspace.path()).expect("create writer");
        assert!(writer.dir().is_dir());

        let path = writer.write(&sample_suite()).expect("Should write");
        assert_eq!(path, workspace.path().join("test-reports").join("TEST-FooTests.xml"));

        let content = fs::read_to_string(&path).expect("read report");
        assert_eq!(content, render(&sample_suite()).expect("render"));

        let leftovers: Vec<_> = fs::read_dir(writer.dir())
            .expect("list reports")
            .filter_map(Result::ok)
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    }

    #[test]
    fn test_write_failure_leaves_no_report() {
        let workspace = tempfile::tempdir().expect("create temp dir");
        let writer = ReportWriter::new(workspace.path()).expect("create writer");
        fs::remove_dir_all(writer.dir()).expect("remove reports dir");

        let err = writer.write(&sample_suite()).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
        assert!(!writer.report_path("FooTests").exists());
    }

    #[test]
    fn test_xml_safe() {
        assert!(matches!(xml_safe("plain text"), Cow::Borrowed(_)));
        assert_eq!(xml_safe("a\u{0}b\tc"), "ab\tc");
    }
}
