#![no_main]

use libfuzzer_sys::fuzz_target;
use lispdoc::engine::Blocks;
use lispdoc_syntax::{DocStringIndex, reader};

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the reader on the whole unit
        let _ = reader::read_all(s);
        let _ = DocStringIndex::build(s);
        // Locate and delimit every block, then read both halves the way a run would
        for block in Blocks::new(s) {
            let _ = reader::read_first(&block.raw_input);
            let _ = reader::read_first(&block.raw_expected);
        }
    }
});
