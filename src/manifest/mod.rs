//! Readers for the flat-text CUB-200 manifest files.
//!
//! Each manifest is whitespace-delimited, one record per line. Blank lines
//! are ignored; any other malformed line is a fatal
//! [`CubError::ManifestParse`](crate::error::CubError::ManifestParse).
//!
//! - [`classes`]: `<id> <label text>`
//! - [`bboxes`]: `<filename> <xmin> <ymin> <xmax> <ymax>`
//! - [`split_table`]: `<image id> <0|1>` zipped with `<image id> <path>`

pub mod bboxes;
pub mod classes;
pub mod split_table;

pub use bboxes::{from_bounding_boxes_str, read_bounding_boxes_file, BoundingBoxTable};
pub use classes::{from_classes_str, read_classes_file, ClassEntry, ClassManifest};
pub use split_table::{from_split_strs, read_split_table, SplitTable, VALIDATION_DRAW_MAX};

#[cfg(feature = "fuzzing")]
pub use split_table::fuzz_parse_split_table;

use std::fs;
use std::path::Path;

use crate::error::CubError;

/// A non-blank manifest line split into whitespace tokens.
struct ManifestLine<'a> {
    /// 1-based line number in the source file.
    number: usize,
    tokens: Vec<&'a str>,
}

fn manifest_lines(contents: &str) -> impl Iterator<Item = ManifestLine<'_>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| ManifestLine {
            number: idx + 1,
            tokens: line.split_whitespace().collect(),
        })
}

fn read_manifest(path: &Path) -> Result<String, CubError> {
    fs::read_to_string(path).map_err(CubError::Io)
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> CubError {
    CubError::ManifestParse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lines_skip_blank_lines_and_keep_numbers() {
        let lines: Vec<_> = manifest_lines("1 a\n\n   \n2 b\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[0].tokens, vec!["1", "a"]);
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[1].tokens, vec!["2", "b"]);
    }
}
