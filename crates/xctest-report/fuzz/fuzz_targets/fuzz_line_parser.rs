// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for line classification and the parser state machine
//!
//! Lines are fed to a `LogParser` collecting suites in memory. Parse errors
//! are expected; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;

use xctest_report::LogParser;
use xctest_report::model::Suite;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut parser = LogParser::new("fuzz", Vec::<Suite>::new());
        for line in input.lines() {
            if parser.process_line(line).is_err() {
                break;
            }
        }
        let _ = parser.finish();
    }
});
