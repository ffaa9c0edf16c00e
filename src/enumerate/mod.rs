//! Image file discovery.
//!
//! The image tree is expected to look like
//!
//! ```text
//! images_directory/001.Black_footed_Albatross/Black_Footed_Albatross_0046_18.jpg
//! images_directory/001.Black_footed_Albatross/...
//! images_directory/002.Laysan_Albatross/...
//! ```
//!
//! where each directory name is a label text from the classes manifest.

use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use walkdir::WalkDir;

use crate::dataset::ImageEntry;
use crate::error::CubError;
use crate::manifest::ClassManifest;

/// Seed for the shuffle applied to the enumerated files.
pub const SHUFFLE_SEED: u64 = 12345;

/// Lists every image file of every class and shuffles them.
///
/// Files are taken from directly under `<root>/<label text>/`; nested
/// directories are not searched. A class without a directory contributes
/// no files. The shuffle is seeded with [`SHUFFLE_SEED`], so the same tree
/// and manifest always give the same order.
pub fn find_image_files(root: &Path, classes: &ClassManifest) -> Result<Vec<ImageEntry>, CubError> {
    info!(
        "Determining list of input files and labels from {}.",
        root.display()
    );

    let mut entries = Vec::new();
    for (index, class) in classes.iter().enumerate() {
        let class_dir = root.join(&class.text);
        for path in list_class_files(&class_dir)? {
            entries.push(ImageEntry::new(path, class.text.clone(), class.label));
        }

        let finished = index + 1;
        if finished % 100 == 0 {
            info!(
                "Finished finding files in {} of {} classes.",
                finished,
                classes.len()
            );
        }
    }

    let mut rng = StdRng::seed_from_u64(SHUFFLE_SEED);
    entries.shuffle(&mut rng);

    info!(
        "Found {} image files across {} labels inside {}.",
        entries.len(),
        classes.len(),
        root.display()
    );
    Ok(entries)
}

fn list_class_files(class_dir: &Path) -> Result<Vec<PathBuf>, CubError> {
    if !class_dir.is_dir() {
        debug!("No image directory at {}", class_dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(class_dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| CubError::Walk {
            path: class_dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
