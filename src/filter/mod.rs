//! Selects the enumerated images that belong to one split.

use log::info;

use crate::dataset::{ImageEntry, Split, SplitFiles};
use crate::error::CubError;
use crate::manifest::{BoundingBoxTable, SplitTable};

/// Keeps the entries whose basename is assigned to `split` and attaches
/// their bounding boxes.
///
/// Enumeration order is preserved. Every entry must have a split
/// assignment; the first one without is a
/// [`CubError::MissingSplitAssignment`].
pub fn filter_split(
    entries: &[ImageEntry],
    splits: &SplitTable,
    bboxes: &BoundingBoxTable,
    split: Split,
) -> Result<SplitFiles, CubError> {
    let mut kept = Vec::new();
    for entry in entries {
        let filename = entry.basename();
        let assigned = splits
            .get(filename)
            .ok_or_else(|| CubError::MissingSplitAssignment {
                filename: filename.to_string(),
            })?;
        if assigned == split {
            kept.push(entry.clone());
        }
    }

    let boxes: Vec<_> = kept
        .iter()
        .map(|entry| bboxes.get(entry.basename()).to_vec())
        .collect();
    let images_with_boxes = kept
        .iter()
        .filter(|entry| bboxes.contains(entry.basename()))
        .count();

    info!(
        "Found {} images with bboxes out of {} {} images",
        images_with_boxes,
        kept.len(),
        split
    );

    Ok(SplitFiles {
        entries: kept,
        boxes,
        images_with_boxes,
    })
}
