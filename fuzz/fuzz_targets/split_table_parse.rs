//! Fuzz target for the split/images manifest pair.
//!
//! The input is cut at the first NUL byte: the part before it is the split
//! manifest, the rest is the images manifest.

#![no_main]

use cub_tfrecord::manifest::fuzz_parse_split_table;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (split, images) = text.split_once('\0').unwrap_or((text, ""));

    let _ = fuzz_parse_split_table(split, images);
});
