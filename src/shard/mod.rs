//! Parallel shard writing for one split.
//!
//! The split's images are cut into one contiguous range per worker, and
//! each worker cuts its range again into `shards / workers` consecutive
//! shards. With 128 shards and 8 workers, worker 0 writes shards 0-15 from
//! the first eighth of the images, worker 1 writes shards 16-31, and so on.
//! Range boundaries are evenly spaced over the indices, so shard sizes
//! differ by at most one image before any skips.

mod report;

pub use report::{ShardSummary, SplitReport};

use std::ops::Range;
use std::path::Path;
use std::thread;

use log::{info, warn};

use crate::config::SplitPlan;
use crate::dataset::{ImageRecord, Split, SplitFiles};
use crate::error::CubError;
use crate::tfrecord::{image_example, RecordWriter};
use crate::transcode::process_image;

/// A progress line is logged every this many images per worker.
const PROGRESS_INTERVAL: usize = 1000;

/// `parts + 1` evenly spaced boundaries from `start` to `end`, rounded down.
///
/// Consecutive boundaries form `parts` ranges that cover `start..end`
/// exactly; their lengths differ by at most one.
pub fn spacing(start: usize, end: usize, parts: usize) -> Vec<usize> {
    let span = end - start;
    (0..=parts).map(|i| start + i * span / parts).collect()
}

/// The index range each worker processes.
pub fn worker_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    to_ranges(&spacing(0, len, workers))
}

/// The index ranges of the shards inside one worker's range.
pub fn shard_ranges(range: &Range<usize>, shards_per_worker: usize) -> Vec<Range<usize>> {
    to_ranges(&spacing(range.start, range.end, shards_per_worker))
}

fn to_ranges(bounds: &[usize]) -> Vec<Range<usize>> {
    bounds.windows(2).map(|w| w[0]..w[1]).collect()
}

/// File name of one shard, e.g. `train-00002-of-00010`.
pub fn shard_file_name(split: Split, shard: usize, total: usize) -> String {
    format!("{}-{:05}-of-{:05}", split, shard, total)
}

/// Writes every shard of one split into `split_dir`.
///
/// Spawns one thread per worker range and waits for all of them. Images
/// that fail to transcode are logged and left out; I/O errors on the shard
/// files are fatal and returned once every worker has stopped.
pub fn write_split(
    plan: &SplitPlan,
    files: &SplitFiles,
    split_dir: &Path,
) -> Result<SplitReport, CubError> {
    plan.check()?;

    let ranges = worker_ranges(files.len(), plan.workers);
    info!(
        "Launching {} threads for {} spacings: {:?}",
        plan.workers, plan.split, ranges
    );

    let results: Vec<Result<Vec<ShardSummary>, CubError>> = thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .cloned()
            .enumerate()
            .map(|(worker, range)| {
                scope.spawn(move || write_worker_shards(plan, worker, range, files, split_dir))
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| {
                handle.join().unwrap_or_else(|_| {
                    Err(CubError::WorkerPanicked {
                        split: plan.split.to_string(),
                        worker,
                    })
                })
            })
            .collect()
    });

    let mut shards = Vec::with_capacity(plan.shards);
    for result in results {
        shards.extend(result?);
    }

    let report = SplitReport {
        split: plan.split,
        files: files.len(),
        images_with_boxes: files.images_with_boxes,
        workers: plan.workers,
        shards,
    };
    info!(
        "Finished writing all {} images in the {} data set ({} skipped).",
        files.len(),
        plan.split,
        report.skipped()
    );
    Ok(report)
}

fn write_worker_shards(
    plan: &SplitPlan,
    worker: usize,
    range: Range<usize>,
    files: &SplitFiles,
    split_dir: &Path,
) -> Result<Vec<ShardSummary>, CubError> {
    let per_worker = plan.shards_per_worker();
    let range_len = range.len();
    let mut summaries = Vec::with_capacity(per_worker);
    let mut counter = 0;

    for (s, indices) in shard_ranges(&range, per_worker).into_iter().enumerate() {
        let shard = worker * per_worker + s;
        let path = split_dir.join(shard_file_name(plan.split, shard, plan.shards));
        let shard_write = |source| CubError::ShardWrite {
            path: path.clone(),
            source,
        };

        let mut writer = RecordWriter::create(&path).map_err(shard_write)?;
        let mut skipped = Vec::new();

        for i in indices {
            let entry = &files.entries[i];
            let encoded = match process_image(&entry.path) {
                Ok(encoded) => encoded,
                Err(err) => {
                    warn!("{}", err);
                    warn!(
                        "SKIPPED: Unexpected error while decoding {}.",
                        entry.path.display()
                    );
                    skipped.push(entry.basename().to_string());
                    continue;
                }
            };

            let record = ImageRecord {
                filename: entry.basename(),
                text: &entry.text,
                label: entry.label,
                boxes: &files.boxes[i],
                encoded: encoded.data,
                height: encoded.height,
                width: encoded.width,
            };
            writer
                .write_example(&image_example(&record))
                .map_err(shard_write)?;

            counter += 1;
            if counter % PROGRESS_INTERVAL == 0 {
                info!(
                    "[thread {}]: Processed {} of {} images in thread batch.",
                    worker, counter, range_len
                );
            }
        }

        let written = writer.records_written();
        writer.finish().map_err(shard_write)?;
        info!(
            "[thread {}]: Wrote {} images to {}",
            worker,
            written,
            path.display()
        );

        summaries.push(ShardSummary {
            shard,
            path,
            written,
            skipped,
        });
    }

    info!(
        "[thread {}]: Wrote {} images to {} shards.",
        worker, counter, per_worker
    );
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_matches_floor_of_linspace() {
        assert_eq!(spacing(0, 10, 4), vec![0, 2, 5, 7, 10]);
        assert_eq!(spacing(0, 3, 8), vec![0, 0, 0, 1, 1, 1, 2, 2, 3]);
        assert_eq!(spacing(5, 5, 2), vec![5, 5, 5]);
        assert_eq!(spacing(7, 13, 3), vec![7, 9, 11, 13]);
    }

    #[test]
    fn worker_ranges_cover_everything_once() {
        let ranges = worker_ranges(11, 4);
        assert_eq!(ranges, vec![0..2, 2..5, 5..8, 8..11]);
    }

    #[test]
    fn empty_split_still_yields_one_range_per_worker() {
        let ranges = worker_ranges(0, 3);
        assert_eq!(ranges.len(), 3);
        assert!(ranges.iter().all(|r| r.is_empty()));
    }

    #[test]
    fn shard_ranges_subdivide_a_worker_range() {
        assert_eq!(shard_ranges(&(10..17), 2), vec![10..13, 13..17]);
    }

    #[test]
    fn shard_file_names_are_zero_padded() {
        assert_eq!(shard_file_name(Split::Train, 2, 10), "train-00002-of-00010");
        assert_eq!(
            shard_file_name(Split::Validation, 127, 128),
            "validation-00127-of-00128"
        );
    }

    #[test]
    fn indivisible_plan_is_rejected_before_spawning() {
        let plan = SplitPlan {
            split: Split::Train,
            shards: 3,
            workers: 2,
        };
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = write_split(&plan, &SplitFiles::default(), temp.path()).unwrap_err();
        assert!(matches!(err, CubError::InvalidConfig(_)));
    }

    #[test]
    fn empty_split_writes_empty_shard_files() {
        let plan = SplitPlan {
            split: Split::Validation,
            shards: 4,
            workers: 2,
        };
        let temp = tempfile::tempdir().expect("create temp dir");
        let report = write_split(&plan, &SplitFiles::default(), temp.path()).expect("write");

        assert_eq!(report.shards.len(), 4);
        assert_eq!(report.written(), 0);
        for (i, shard) in report.shards.iter().enumerate() {
            assert_eq!(shard.shard, i);
            assert!(shard.path.is_file());
            assert_eq!(std::fs::metadata(&shard.path).expect("metadata").len(), 0);
        }
    }

    #[test]
    fn missing_output_directory_is_a_shard_write_error() {
        let plan = SplitPlan {
            split: Split::Test,
            shards: 1,
            workers: 1,
        };
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = write_split(&plan, &SplitFiles::default(), &temp.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, CubError::ShardWrite { .. }));
    }
}
