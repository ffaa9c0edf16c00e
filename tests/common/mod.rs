#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use cub_tfrecord::{Config, SplitSampling};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
    })
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(&gradient(width, height))
        .expect("encode jpeg");
    bytes
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    fs::write(path, jpeg_bytes(width, height)).expect("write jpeg file");
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .expect("write png file");
}

/// A real JPEG cut off halfway through its scan data.
pub fn write_truncated_jpeg(path: &Path) {
    ensure_parent(path);
    let bytes = jpeg_bytes(128, 96);
    fs::write(path, &bytes[..bytes.len() / 2]).expect("write truncated jpeg");
}

pub fn write_garbage(path: &Path) {
    ensure_parent(path);
    fs::write(path, b"definitely not an image").expect("write garbage file");
}

/// How a fixture image is stored on disk.
#[derive(Clone, Copy)]
pub enum Kind {
    Jpeg,
    Png,
    Corrupt,
    Truncated,
}

/// One image of a generated CUB tree.
pub struct FixtureImage {
    pub class_dir: &'static str,
    pub name: &'static str,
    pub kind: Kind,
    /// `true` writes a "1" (training) flag, `false` a "0" (test) flag.
    pub is_training: bool,
    pub bbox: Option<[f32; 4]>,
}

impl FixtureImage {
    pub fn train(class_dir: &'static str, name: &'static str) -> Self {
        Self {
            class_dir,
            name,
            kind: Kind::Jpeg,
            is_training: true,
            bbox: Some([1.0, 2.0, 10.0, 12.0]),
        }
    }

    pub fn test(class_dir: &'static str, name: &'static str) -> Self {
        Self {
            is_training: false,
            ..Self::train(class_dir, name)
        }
    }

    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub fn without_bbox(mut self) -> Self {
        self.bbox = None;
        self
    }
}

/// Writes the class directories and all four manifests under `root` and
/// returns a single-threaded config pointing at them.
///
/// Classes are numbered in the order they first appear in `images`.
pub fn write_cub_dataset(root: &Path, images: &[FixtureImage]) -> Config {
    let images_dir = root.join("images");
    let output_dir = root.join("out");
    fs::create_dir_all(&images_dir).expect("create images dir");
    fs::create_dir_all(&output_dir).expect("create output dir");

    let mut class_dirs: Vec<&str> = Vec::new();
    let mut images_txt = String::new();
    let mut split_txt = String::new();
    let mut bboxes_txt = String::new();

    for (i, img) in images.iter().enumerate() {
        if !class_dirs.contains(&img.class_dir) {
            class_dirs.push(img.class_dir);
        }

        let path = images_dir.join(img.class_dir).join(img.name);
        match img.kind {
            Kind::Jpeg => write_jpeg(&path, 32, 24),
            Kind::Png => write_png(&path, 20, 16),
            Kind::Corrupt => write_garbage(&path),
            Kind::Truncated => write_truncated_jpeg(&path),
        }

        let id = i + 1;
        images_txt.push_str(&format!("{} {}/{}\n", id, img.class_dir, img.name));
        split_txt.push_str(&format!("{} {}\n", id, if img.is_training { 1 } else { 0 }));
        if let Some([x0, y0, x1, y1]) = img.bbox {
            bboxes_txt.push_str(&format!("{} {} {} {} {}\n", img.name, x0, y0, x1, y1));
        }
    }

    let classes_txt: String = class_dirs
        .iter()
        .enumerate()
        .map(|(i, dir)| format!("{} {}\n", i + 1, dir))
        .collect();

    let manifest = |name: &str, contents: &str| -> PathBuf {
        let path = root.join(name);
        fs::write(&path, contents).expect("write manifest");
        path
    };

    Config {
        images_directory: images_dir,
        output_directory: output_dir,
        classes_file: manifest("classes.txt", &classes_txt),
        bounding_boxes_file: manifest("bounding_boxes.txt", &bboxes_txt),
        data_split_file: manifest("train_test_split.txt", &split_txt),
        images_file: manifest("images.txt", &images_txt),
        train_shards: 1,
        validation_shards: 1,
        num_threads: 1,
        sampling: SplitSampling::never(),
    }
}

/// Shard files in `dir`, sorted by name.
pub fn shard_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read split dir")
        .map(|entry| entry.expect("dir entry").path())
        .collect();
    files.sort();
    files
}
