//! Read-back inspection of a directory of shards.
//!
//! Every record is checked against its CRCs and decoded as an Example,
//! so a clean inspection means the shards are readable by TensorFlow.

mod report;

pub use report::{InspectReport, LabelCount, ShardStats};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CubError;
use crate::tfrecord::example::keys;
use crate::tfrecord::RecordReader;

/// Options for shard inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Number of top labels to show in the histogram.
    pub top_labels: usize,
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            top_labels: 10,
            bar_width: 20,
        }
    }
}

/// Inspects every shard file directly inside `dir`, in file-name order.
pub fn inspect_shards(dir: &Path, opts: &InspectOptions) -> Result<InspectReport, CubError> {
    let mut shards = Vec::new();
    let mut label_counts: HashMap<String, usize> = HashMap::new();
    let mut boxes = 0;
    let mut images_with_boxes = 0;

    for path in shard_files(dir)? {
        let mut reader = RecordReader::open(&path)?;
        let mut records = 0;

        while let Some(example) = reader.read_example().map_err(|e| CubError::RecordDecode {
            path: path.clone(),
            message: e.to_string(),
        })? {
            records += 1;

            let label = example
                .text(keys::CLASS_TEXT)
                .unwrap_or("<missing label>")
                .to_string();
            *label_counts.entry(label).or_insert(0) += 1;

            let n = example.floats(keys::BBOX_XMIN).map_or(0, <[f32]>::len);
            boxes += n;
            if n > 0 {
                images_with_boxes += 1;
            }
        }

        shards.push(ShardStats { path, records });
    }

    let (labels, other_count, distinct_labels) = top_labels(label_counts, opts.top_labels);

    Ok(InspectReport {
        directory: dir.to_path_buf(),
        shards,
        boxes,
        images_with_boxes,
        labels,
        other_count,
        distinct_labels,
        bar_width: opts.bar_width,
    })
}

fn shard_files(dir: &Path) -> Result<Vec<PathBuf>, CubError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| CubError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Sorts counts descending (ties by name) and keeps the first `top_n`.
fn top_labels(counts: HashMap<String, usize>, top_n: usize) -> (Vec<LabelCount>, usize, usize) {
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let distinct = sorted.len();
    let other_count = sorted.iter().skip(top_n).map(|(_, count)| count).sum();
    let labels = sorted
        .into_iter()
        .take(top_n)
        .map(|(label, count)| LabelCount { label, count })
        .collect();

    (labels, other_count, distinct)
}
