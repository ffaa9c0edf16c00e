//! Per-split conversion reports.
//!
//! The shard writer fills one [`SplitReport`] per split so the CLI can
//! show how many images made it into each shard and how many were skipped.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::dataset::Split;

/// What happened to one shard file.
#[derive(Clone, Debug, Serialize)]
pub struct ShardSummary {
    /// Global shard index within the split.
    pub shard: usize,
    pub path: PathBuf,
    /// Records written to the file.
    pub written: usize,
    /// Basenames of the images that failed to transcode.
    pub skipped: Vec<String>,
}

/// The outcome of writing one split.
#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    pub split: Split,
    /// Images selected for the split before transcoding.
    pub files: usize,
    /// Selected images with at least one bounding box.
    pub images_with_boxes: usize,
    pub workers: usize,
    /// One entry per shard file, ordered by shard index.
    pub shards: Vec<ShardSummary>,
}

impl SplitReport {
    /// Total records written across all shards.
    pub fn written(&self) -> usize {
        self.shards.iter().map(|s| s.written).sum()
    }

    /// Total images skipped across all shards.
    pub fn skipped(&self) -> usize {
        self.shards.iter().map(|s| s.skipped.len()).sum()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.split)?;
        writeln!(
            f,
            "  {} images selected ({} with bounding boxes)",
            self.files, self.images_with_boxes
        )?;
        writeln!(
            f,
            "  {} records written to {} shard(s) by {} worker(s)",
            self.written(),
            self.shards.len(),
            self.workers
        )?;

        let skipped = self.skipped();
        if skipped > 0 {
            writeln!(f, "  {} image(s) skipped:", skipped)?;
            for shard in &self.shards {
                for name in &shard.skipped {
                    writeln!(f, "    - {} (shard {})", name, shard.shard)?;
                }
            }
        }

        Ok(())
    }
}
