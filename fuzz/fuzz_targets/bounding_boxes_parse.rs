//! Fuzz target for bounding-box manifest parsing.
//!
//! This fuzzer feeds arbitrary text to the bounding-box parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use cub_tfrecord::manifest::from_bounding_boxes_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = from_bounding_boxes_str(text);
    }
});
