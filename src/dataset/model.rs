//! Per-image entries and the records built from them.

use std::path::{Path, PathBuf};

use super::bbox::BBox;

/// One image discovered by the file enumerator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageEntry {
    /// Full path to the image file.
    pub path: PathBuf,
    /// Human-readable label, i.e. the class directory name.
    pub text: String,
    /// Numeric class label, starting at 1.
    pub label: i64,
}

impl ImageEntry {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, label: i64) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            label,
        }
    }

    /// The file name component of the image path.
    pub fn basename(&self) -> &str {
        basename(&self.path)
    }
}

/// Returns the final component of `path` as UTF-8, or an empty string.
pub fn basename(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
}

/// The images belonging to one split, with their bounding boxes.
///
/// `boxes[i]` holds the boxes for `entries[i]`; an image without any
/// bounding-box rows gets an empty list.
#[derive(Clone, Debug, Default)]
pub struct SplitFiles {
    pub entries: Vec<ImageEntry>,
    pub boxes: Vec<Vec<BBox>>,
    /// Number of entries with at least one bounding box.
    pub images_with_boxes: usize,
}

impl SplitFiles {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully transcoded image, ready to be serialized into a shard.
#[derive(Clone, Debug)]
pub struct ImageRecord<'a> {
    pub filename: &'a str,
    pub text: &'a str,
    pub label: i64,
    pub boxes: &'a [BBox],
    pub encoded: Vec<u8>,
    pub height: u32,
    pub width: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_takes_last_component() {
        let entry = ImageEntry::new("/data/images/001.Albatross/bird_01.jpg", "001.Albatross", 1);
        assert_eq!(entry.basename(), "bird_01.jpg");
    }

    #[test]
    fn basename_of_root_is_empty() {
        assert_eq!(basename(Path::new("/")), "");
    }
}
