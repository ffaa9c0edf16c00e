//! Conversion configuration.
//!
//! A [`Config`] is built once (usually from the CLI) and passed by
//! reference to every stage of the pipeline.

use std::path::{Path, PathBuf};

use crate::dataset::Split;
use crate::error::CubError;
use crate::manifest::VALIDATION_DRAW_MAX;

/// Number of shards always written for the test split.
pub const TEST_SHARDS: usize = 1;

/// How train-flagged rows are sampled into the validation split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSampling {
    /// A row becomes validation when a uniform draw from
    /// `1..=VALIDATION_DRAW_MAX` is at most this value. Zero disables
    /// validation sampling entirely.
    pub validation_threshold: u32,
    /// Upper bound on validation rows across the whole split file.
    pub validation_cap: usize,
    /// RNG seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SplitSampling {
    fn default() -> Self {
        Self {
            validation_threshold: 10,
            validation_cap: 400,
            seed: None,
        }
    }
}

impl SplitSampling {
    /// Sampling that never assigns anything to validation.
    pub fn never() -> Self {
        Self {
            validation_threshold: 0,
            ..Self::default()
        }
    }
}

/// Everything the converter needs to know about one run.
#[derive(Clone, Debug)]
pub struct Config {
    pub images_directory: PathBuf,
    pub output_directory: PathBuf,
    pub classes_file: PathBuf,
    pub bounding_boxes_file: PathBuf,
    pub data_split_file: PathBuf,
    pub images_file: PathBuf,
    pub train_shards: usize,
    pub validation_shards: usize,
    pub num_threads: usize,
    pub sampling: SplitSampling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_directory: PathBuf::from("/tmp/"),
            output_directory: PathBuf::from("/tmp/"),
            classes_file: PathBuf::from("classes.txt"),
            bounding_boxes_file: PathBuf::from("bounding_boxes.txt"),
            data_split_file: PathBuf::from("train_test_split.txt"),
            images_file: PathBuf::from("images.txt"),
            train_shards: 1024,
            validation_shards: 128,
            num_threads: 8,
            sampling: SplitSampling::default(),
        }
    }
}

/// Shard and worker counts for one split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitPlan {
    pub split: Split,
    pub shards: usize,
    pub workers: usize,
}

impl SplitPlan {
    /// Number of consecutive shards each worker owns.
    pub fn shards_per_worker(&self) -> usize {
        self.shards / self.workers
    }

    pub(crate) fn check(&self) -> Result<(), CubError> {
        if self.workers == 0 {
            return Err(CubError::InvalidConfig(format!(
                "{} split needs at least one worker",
                self.split
            )));
        }
        if self.shards == 0 {
            return Err(CubError::InvalidConfig(format!(
                "{} split needs at least one shard",
                self.split
            )));
        }
        if self.shards % self.workers != 0 {
            return Err(CubError::InvalidConfig(format!(
                "{} shards ({}) must be a multiple of the thread count ({})",
                self.split, self.shards, self.workers
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Checks the shard/thread arithmetic before any work starts.
    pub fn validate(&self) -> Result<(), CubError> {
        if self.num_threads == 0 {
            return Err(CubError::InvalidConfig(
                "num_threads must be greater than 0".to_string(),
            ));
        }
        if self.sampling.validation_threshold > VALIDATION_DRAW_MAX {
            return Err(CubError::InvalidConfig(format!(
                "validation_threshold must be at most {}",
                VALIDATION_DRAW_MAX
            )));
        }
        for plan in self.split_plans() {
            plan.check()?;
        }
        Ok(())
    }

    /// Plans for every split, in processing order.
    pub fn split_plans(&self) -> [SplitPlan; 3] {
        Split::PROCESSING_ORDER.map(|split| self.plan_for(split))
    }

    /// The test split always gets a single shard written by a single worker,
    /// whatever `num_threads` says.
    pub fn plan_for(&self, split: Split) -> SplitPlan {
        match split {
            Split::Train => SplitPlan {
                split,
                shards: self.train_shards,
                workers: self.num_threads,
            },
            Split::Validation => SplitPlan {
                split,
                shards: self.validation_shards,
                workers: self.num_threads,
            },
            Split::Test => SplitPlan {
                split,
                shards: TEST_SHARDS,
                workers: 1,
            },
        }
    }

    /// Directory the shards of `split` are written to.
    pub fn split_directory(&self, split: Split) -> PathBuf {
        split_directory(&self.output_directory, split)
    }
}

pub(crate) fn split_directory(output_directory: &Path, split: Split) -> PathBuf {
    output_directory.join(split.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().expect("defaults should validate");
    }

    #[test]
    fn train_shards_must_divide_by_threads() {
        let config = Config {
            train_shards: 10,
            num_threads: 4,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CubError::InvalidConfig(msg) if msg.contains("train")));
    }

    #[test]
    fn validation_shards_must_divide_by_threads() {
        let config = Config {
            validation_shards: 6,
            num_threads: 4,
            train_shards: 8,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CubError::InvalidConfig(msg) if msg.contains("validation")));
    }

    #[test]
    fn zero_threads_is_rejected() {
        let config = Config {
            num_threads: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_uses_one_shard_and_one_worker() {
        let config = Config {
            num_threads: 8,
            ..Config::default()
        };
        let plan = config.plan_for(Split::Test);
        assert_eq!(plan.shards, 1);
        assert_eq!(plan.workers, 1);
        assert_eq!(plan.shards_per_worker(), 1);
    }

    #[test]
    fn plans_follow_processing_order() {
        let splits: Vec<Split> = Config::default()
            .split_plans()
            .iter()
            .map(|plan| plan.split)
            .collect();
        assert_eq!(splits, vec![Split::Validation, Split::Train, Split::Test]);
    }

    #[test]
    fn threshold_above_draw_range_is_rejected() {
        let config = Config {
            sampling: SplitSampling {
                validation_threshold: VALIDATION_DRAW_MAX + 1,
                ..SplitSampling::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn split_directory_is_named_after_split() {
        let config = Config {
            output_directory: PathBuf::from("/out"),
            ..Config::default()
        };
        assert_eq!(
            config.split_directory(Split::Validation),
            PathBuf::from("/out/validation")
        );
    }
}
