//! Classes manifest reader.
//!
//! Lines look like `1 001.Black_footed_Albatross`. The label text is the
//! second token and doubles as the name of the class's image directory.
//! Numeric labels come from file order, starting at 1; label 0 is left
//! free as the background class.

use std::path::Path;

use super::{manifest_lines, parse_error, read_manifest};
use crate::error::CubError;

/// One class: its numeric label and the directory-name label text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub label: i64,
    pub text: String,
}

/// Ordered list of classes as read from the classes file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassManifest {
    classes: Vec<ClassEntry>,
}

impl ClassManifest {
    /// Builds a manifest from label texts, assigning labels `1..=len`.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| ClassEntry {
                label: (i + 1) as i64,
                text: text.into(),
            })
            .collect();
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }
}

/// Reads the classes manifest at `path`.
pub fn read_classes_file(path: &Path) -> Result<ClassManifest, CubError> {
    let contents = read_manifest(path)?;
    parse_classes(&contents, path)
}

/// Parses a classes manifest held in memory.
pub fn from_classes_str(contents: &str) -> Result<ClassManifest, CubError> {
    parse_classes(contents, Path::new("<classes>"))
}

fn parse_classes(contents: &str, path: &Path) -> Result<ClassManifest, CubError> {
    let mut texts = Vec::new();
    for line in manifest_lines(contents) {
        let Some(text) = line.tokens.get(1) else {
            return Err(parse_error(
                path,
                line.number,
                "expected '<id> <label text>'",
            ));
        };
        texts.push(*text);
    }

    Ok(ClassManifest::from_texts(texts))
}
