#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A whitespace-free manifest token.
pub fn arb_token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.]{1,12}"
}

/// Class directory names, e.g. `"004.Groove_billed_Ani"`.
pub fn arb_class_names(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_token(), 1..=max)
}

/// Pixel coordinates of one box as written in `bounding_boxes.txt`.
pub fn arb_coords() -> impl Strategy<Value = [f32; 4]> {
    (0.0f32..500.0, 0.0f32..500.0, 1.0f32..200.0, 1.0f32..200.0)
        .prop_map(|(x, y, w, h)| [x, y, x + w, y + h])
}

/// Bounding-box lines as `(basename, coords)` pairs; basenames repeat.
pub fn arb_bbox_rows(max: usize) -> impl Strategy<Value = Vec<(String, [f32; 4])>> {
    prop::collection::vec(("[a-d]_[0-9]\\.jpg", arb_coords()), 0..=max)
}

/// Rows of the split/images pair: unique basenames with a train flag.
pub fn arb_split_rows(max: usize) -> impl Strategy<Value = Vec<(String, bool)>> {
    prop::collection::btree_map("[a-z]{1,6}_[0-9]{1,3}\\.jpg", any::<bool>(), 0..=max)
        .prop_map(|rows| rows.into_iter().collect())
}

/// Renders the split and images manifests for `rows`, ids starting at 1.
pub fn render_split_manifests(rows: &[(String, bool)]) -> (String, String) {
    let mut split = String::new();
    let mut images = String::new();
    for (i, (name, is_training)) in rows.iter().enumerate() {
        split.push_str(&format!("{} {}\n", i + 1, u8::from(*is_training)));
        images.push_str(&format!("{} class/{}\n", i + 1, name));
    }
    (split, images)
}
