//! Bounding-box manifest reader.
//!
//! Every line is `<filename> <xmin> <ymin> <xmax> <ymax>`. A file may list
//! the same image several times; its boxes accumulate in file order.

use std::collections::HashMap;
use std::path::Path;

use log::info;

use super::{manifest_lines, parse_error, read_manifest};
use crate::dataset::BBox;
use crate::error::CubError;

const BBOX_TOKENS: usize = 5;

/// Bounding boxes keyed by image basename.
#[derive(Clone, Debug, Default)]
pub struct BoundingBoxTable {
    boxes: HashMap<String, Vec<BBox>>,
    box_count: usize,
}

impl BoundingBoxTable {
    /// Boxes for `filename`; empty when the manifest never mentions it.
    pub fn get(&self, filename: &str) -> &[BBox] {
        self.boxes
            .get(filename)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when the manifest lists at least one box for `filename`.
    pub fn contains(&self, filename: &str) -> bool {
        self.boxes.contains_key(filename)
    }

    /// Appends a box for `filename`.
    pub fn insert(&mut self, filename: impl Into<String>, bbox: BBox) {
        self.boxes.entry(filename.into()).or_default().push(bbox);
        self.box_count += 1;
    }

    /// Number of distinct images with at least one box.
    pub fn image_count(&self) -> usize {
        self.boxes.len()
    }

    /// Total number of boxes across all images.
    pub fn box_count(&self) -> usize {
        self.box_count
    }
}

/// Reads the bounding-box manifest at `path`.
pub fn read_bounding_boxes_file(path: &Path) -> Result<BoundingBoxTable, CubError> {
    let contents = read_manifest(path)?;
    let table = parse_bounding_boxes(&contents, path)?;
    info!(
        "Successfully read {} bounding boxes across {} images.",
        table.box_count(),
        table.image_count()
    );
    Ok(table)
}

/// Parses a bounding-box manifest held in memory.
pub fn from_bounding_boxes_str(contents: &str) -> Result<BoundingBoxTable, CubError> {
    parse_bounding_boxes(contents, Path::new("<bounding boxes>"))
}

fn parse_bounding_boxes(contents: &str, path: &Path) -> Result<BoundingBoxTable, CubError> {
    let mut table = BoundingBoxTable::default();

    for line in manifest_lines(contents) {
        if line.tokens.len() != BBOX_TOKENS {
            return Err(parse_error(
                path,
                line.number,
                format!(
                    "expected {} tokens '<filename> <xmin> <ymin> <xmax> <ymax>', found {}",
                    BBOX_TOKENS,
                    line.tokens.len()
                ),
            ));
        }

        let mut coords = [0f32; 4];
        for (slot, token) in coords.iter_mut().zip(&line.tokens[1..]) {
            *slot = token.parse().map_err(|_| {
                parse_error(
                    path,
                    line.number,
                    format!("invalid coordinate '{}'", token),
                )
            })?;
        }

        let [xmin, ymin, xmax, ymax] = coords;
        table.insert(line.tokens[0], BBox::from_xyxy(xmin, ymin, xmax, ymax));
    }

    Ok(table)
}
