//! Fuzz target for TFRecord framing and Example decoding.
//!
//! This fuzzer feeds arbitrary byte sequences to the record reader,
//! checking for panics, crashes, or hangs.

#![no_main]

use cub_tfrecord::tfrecord::RecordReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let mut reader = RecordReader::new(data);
    while let Ok(Some(_)) = reader.read_example() {}
});
