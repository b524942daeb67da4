//! xctest-report-cli library
//!
//! Configuration and the stdin-to-stdout pipeline behind the `xctest-report`
//! binary, exported for integration tests.

pub mod config;
pub mod run;
