//! Image normalization: every image leaves this module as RGB JPEG bytes.
//!
//! PNG inputs are decoded and re-encoded as JPEG at quality 100. All other
//! inputs must already be JPEG and are passed through untouched. In both
//! cases the JPEG is decoded once more to read its dimensions and to
//! confirm it yields a three-channel image.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::error::{DecodingError, ImageFormatHint};
use image::{ImageError, ImageFormat, RgbImage};
use log::info;
use thiserror::Error;

/// Quality used when converting PNG inputs to JPEG.
pub const PNG_TO_JPEG_QUALITY: u8 = 100;

/// Number of channels every output image must decode to.
pub const RGB_CHANNELS: u8 = 3;

/// JPEG end-of-image marker.
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Why a single image could not be transcoded.
///
/// These errors are never fatal to a conversion: the shard writer logs
/// them and skips the image.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to encode {path} as JPEG: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("{path} is not a JPEG image")]
    NotJpeg { path: PathBuf },

    #[error("{path} decoded to unexpected shape {height}x{width}x{channels}")]
    BadShape {
        path: PathBuf,
        height: u32,
        width: u32,
        channels: u8,
    },
}

/// JPEG bytes plus the dimensions they decode to.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub height: u32,
    pub width: u32,
}

/// Height, width and channel count of a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedShape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

/// Reads `path` and returns its contents as RGB JPEG bytes.
pub fn process_image(path: &Path) -> Result<EncodedImage, TranscodeError> {
    let data = fs::read(path).map_err(|source| TranscodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let data = if is_png(path) {
        info!("Converting PNG to JPEG for {}", path.display());
        png_to_jpeg(&data, path)?
    } else {
        data
    };

    let shape = decode_jpeg(&data, path)?;
    if shape.channels != RGB_CHANNELS || shape.height == 0 || shape.width == 0 {
        return Err(TranscodeError::BadShape {
            path: path.to_path_buf(),
            height: shape.height,
            width: shape.width,
            channels: shape.channels,
        });
    }

    Ok(EncodedImage {
        data,
        height: shape.height,
        width: shape.width,
    })
}

/// True when the file name carries a lowercase `.png` extension.
pub fn is_png(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".png"))
}

/// Decodes PNG bytes and re-encodes them as an RGB JPEG.
pub fn png_to_jpeg(data: &[u8], path: &Path) -> Result<Vec<u8>, TranscodeError> {
    let decoded = image::load_from_memory_with_format(data, ImageFormat::Png).map_err(|source| {
        TranscodeError::Decode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let rgb = decoded.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, PNG_TO_JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|source| TranscodeError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(jpeg)
}

/// Decodes JPEG bytes to RGB and reports the resulting shape.
///
/// Grayscale and CMYK JPEGs are converted to RGB, so they report three
/// channels like any colour image. The decoder pads a truncated scan with
/// filler instead of failing, so data that does not end in an EOI marker
/// is rejected before decoding.
pub fn decode_jpeg(data: &[u8], path: &Path) -> Result<DecodedShape, TranscodeError> {
    if !matches!(image::guess_format(data), Ok(ImageFormat::Jpeg)) {
        return Err(TranscodeError::NotJpeg {
            path: path.to_path_buf(),
        });
    }
    if !has_end_of_image(data) {
        return Err(TranscodeError::Decode {
            path: path.to_path_buf(),
            source: ImageError::Decoding(DecodingError::new(
                ImageFormatHint::Exact(ImageFormat::Jpeg),
                "missing end-of-image marker, file is truncated",
            )),
        });
    }

    let decoded = image::load_from_memory_with_format(data, ImageFormat::Jpeg).map_err(
        |source| TranscodeError::Decode {
            path: path.to_path_buf(),
            source,
        },
    )?;
    let rgb: RgbImage = decoded.into_rgb8();

    Ok(DecodedShape {
        height: rgb.height(),
        width: rgb.width(),
        channels: rgb.sample_layout().channels,
    })
}

/// True when `data` ends with the JPEG EOI marker, ignoring zero padding.
fn has_end_of_image(data: &[u8]) -> bool {
    let end = data.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    data[..end].ends_with(&JPEG_EOI)
}
