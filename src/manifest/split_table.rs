//! Train/validation/test assignment from the split and images manifests.
//!
//! `train_test_split.txt` holds `<image id> <is_training>` and `images.txt`
//! holds `<image id> <class dir>/<file name>`. The two files are read side
//! by side: line N of one describes the same image as line N of the other,
//! and their leading IDs must agree.
//!
//! Rows flagged `0` go to test. Every other row is sampled into validation
//! with probability `validation_threshold / VALIDATION_DRAW_MAX`, until
//! `validation_cap` rows have been picked; the rest go to train.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{manifest_lines, parse_error, read_manifest, ManifestLine};
use crate::config::SplitSampling;
use crate::dataset::Split;
use crate::error::CubError;

/// Validation draws are uniform over `1..=VALIDATION_DRAW_MAX`.
pub const VALIDATION_DRAW_MAX: u32 = 101;

const TEST_FLAG: &str = "0";

/// Split assignment keyed by image basename.
#[derive(Clone, Debug, Default)]
pub struct SplitTable {
    assignments: HashMap<String, Split>,
    rows: usize,
}

impl SplitTable {
    /// The split `filename` was assigned to, if any.
    pub fn get(&self, filename: &str) -> Option<Split> {
        self.assignments.get(filename).copied()
    }

    /// Records `split` for `filename` unless it already has an assignment.
    pub fn assign(&mut self, filename: impl Into<String>, split: Split) {
        self.assignments.entry(filename.into()).or_insert(split);
        self.rows += 1;
    }

    /// Number of distinct images with an assignment.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of manifest rows read, duplicates included.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of images assigned to `split`.
    pub fn count(&self, split: Split) -> usize {
        self.assignments.values().filter(|s| **s == split).count()
    }
}

/// Decides the split for each row, holding the validation running count.
struct ValidationSampler<R> {
    rng: R,
    threshold: u32,
    cap: usize,
    picked: usize,
}

impl<R: Rng> ValidationSampler<R> {
    fn new(rng: R, sampling: &SplitSampling) -> Self {
        Self {
            rng,
            threshold: sampling.validation_threshold,
            cap: sampling.validation_cap,
            picked: 0,
        }
    }

    fn assign(&mut self, flag: &str) -> Split {
        if flag == TEST_FLAG {
            return Split::Test;
        }

        let draw = self.rng.random_range(1..=VALIDATION_DRAW_MAX);
        if draw <= self.threshold && self.picked < self.cap {
            self.picked += 1;
            Split::Validation
        } else {
            Split::Train
        }
    }
}

fn sampling_rng(sampling: &SplitSampling) -> StdRng {
    match sampling.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Reads the split and images manifests and assigns every image a split.
pub fn read_split_table(
    split_path: &Path,
    images_path: &Path,
    sampling: &SplitSampling,
) -> Result<SplitTable, CubError> {
    let split_contents = read_manifest(split_path)?;
    let images_contents = read_manifest(images_path)?;
    let table = parse_split_table(
        &split_contents,
        split_path,
        &images_contents,
        images_path,
        sampling,
    )?;
    info!(
        "Successfully read {} dataset assignments across {} images.",
        table.row_count(),
        table.len()
    );
    Ok(table)
}

/// Builds a split table from manifests held in memory.
pub fn from_split_strs(
    split_contents: &str,
    images_contents: &str,
    sampling: &SplitSampling,
) -> Result<SplitTable, CubError> {
    parse_split_table(
        split_contents,
        Path::new("<split>"),
        images_contents,
        Path::new("<images>"),
        sampling,
    )
}

fn parse_split_table(
    split_contents: &str,
    split_path: &Path,
    images_contents: &str,
    images_path: &Path,
    sampling: &SplitSampling,
) -> Result<SplitTable, CubError> {
    let split_lines: Vec<ManifestLine<'_>> = manifest_lines(split_contents).collect();
    let image_lines: Vec<ManifestLine<'_>> = manifest_lines(images_contents).collect();

    if split_lines.len() != image_lines.len() {
        return Err(CubError::ManifestMismatch {
            split_path: split_path.to_path_buf(),
            images_path: images_path.to_path_buf(),
            message: format!(
                "{} split rows but {} image rows",
                split_lines.len(),
                image_lines.len()
            ),
        });
    }

    let mut sampler = ValidationSampler::new(sampling_rng(sampling), sampling);
    let mut table = SplitTable::default();

    for (split_line, image_line) in split_lines.iter().zip(&image_lines) {
        let [split_id, flag] = two_tokens(split_line, split_path)?;
        let [image_id, image_rel] = two_tokens(image_line, images_path)?;

        if split_id != image_id {
            return Err(CubError::ManifestMismatch {
                split_path: split_path.to_path_buf(),
                images_path: images_path.to_path_buf(),
                message: format!(
                    "image id '{}' at line {} does not match '{}' at line {}",
                    split_id, split_line.number, image_id, image_line.number
                ),
            });
        }

        let filename = match image_rel.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => {
                return Err(parse_error(
                    images_path,
                    image_line.number,
                    format!("expected '<class dir>/<file name>', found '{}'", image_rel),
                ))
            }
        };

        table.assign(filename, sampler.assign(flag));
    }

    Ok(table)
}

/// Fuzz-only entrypoint for the split/images manifest pair.
///
/// Sampling is seeded so a crashing input replays the same draws.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_split_table(split_contents: &str, images_contents: &str) -> Result<(), CubError> {
    let sampling = SplitSampling {
        seed: Some(0),
        ..SplitSampling::default()
    };
    let _ = from_split_strs(split_contents, images_contents, &sampling)?;
    Ok(())
}

fn two_tokens<'a>(line: &ManifestLine<'a>, path: &Path) -> Result<[&'a str; 2], CubError> {
    match line.tokens.as_slice() {
        [first, second] => Ok([*first, *second]),
        tokens => Err(parse_error(
            path,
            line.number,
            format!("expected 2 tokens, found {}", tokens.len()),
        )),
    }
}
