// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the byte stream adapter
//!
//! Arbitrary bytes are split into arbitrary chunks. Whatever the parser
//! does, the pass-through copy must equal the input.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use xctest_report::model::Suite;
use xctest_report::{LogParser, StreamAdapter};

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    chunk: u8,
}

fuzz_target!(|input: Input| {
    let chunk = usize::from(input.chunk.max(1));
    let mut adapter = StreamAdapter::new(Vec::new(), LogParser::new("fuzz", Vec::<Suite>::new()));
    for piece in input.data.chunks(chunk) {
        let _ = adapter.feed(piece);
    }
    if let Ok((echo, _, _)) = adapter.finish() {
        assert_eq!(echo, input.data);
    }
});
