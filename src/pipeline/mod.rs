//! End-to-end conversion: manifests in, one directory of shards per split out.

use std::fs;

use log::info;

use crate::config::{Config, SplitPlan};
use crate::enumerate::find_image_files;
use crate::error::CubError;
use crate::filter::filter_split;
use crate::manifest::{
    read_bounding_boxes_file, read_classes_file, read_split_table, BoundingBoxTable, SplitTable,
};
use crate::shard::{write_split, SplitReport};

/// Converts the whole dataset described by `config`.
///
/// Splits are written in the order validation, train, test. The first
/// fatal error stops the run; shards of splits that already finished stay
/// on disk.
pub fn convert_dataset(config: &Config) -> Result<Vec<SplitReport>, CubError> {
    config.validate()?;
    info!(
        "Saving results to {}",
        config.output_directory.display()
    );

    let bboxes = read_bounding_boxes_file(&config.bounding_boxes_file)?;
    let splits = read_split_table(
        &config.data_split_file,
        &config.images_file,
        &config.sampling,
    )?;

    config
        .split_plans()
        .iter()
        .map(|plan| process_split(config, plan, &bboxes, &splits))
        .collect()
}

/// Enumerates, filters and writes a single split.
///
/// The image tree is enumerated afresh for every split; the fixed shuffle
/// seed makes each pass produce the same order.
pub fn process_split(
    config: &Config,
    plan: &SplitPlan,
    bboxes: &BoundingBoxTable,
    splits: &SplitTable,
) -> Result<SplitReport, CubError> {
    let classes = read_classes_file(&config.classes_file)?;
    let entries = find_image_files(&config.images_directory, &classes)?;
    let files = filter_split(&entries, splits, bboxes, plan.split)?;

    let split_dir = config.split_directory(plan.split);
    fs::create_dir_all(&split_dir)?;

    write_split(plan, &files, &split_dir)
}
