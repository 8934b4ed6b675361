//! Encoded bytes ↔ [`PixelBuffer`], via the `image` crate.
//!
//! | Direction | Formats | Notes |
//! |---|---|---|
//! | Decode | anything the compiled-in decoders sniff (JPEG, PNG, BMP) | alpha dropped, 16-bit reduced to 8-bit |
//! | Encode | JPEG, PNG, BMP, chosen by output extension | [`Quality`] applies to JPEG only |
//!
//! Grayscale sources stay single-channel; everything else decodes to RGB.
//! Metadata is never read or written.

use super::buffer::{BufferError, ChannelLayout, PixelBuffer};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] ImageError),
    #[error("decoded image is invalid: {0}")]
    InvalidBuffer(#[from] BufferError),
    #[error("unsupported output format: {0:?}")]
    UnsupportedFormat(String),
}

/// Input extensions picked up in batch mode (lowercase, without the dot).
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Quality setting for lossy encoding, always within 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Bmp,
}

impl OutputFormat {
    /// Pick the encoder from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            _ => Err(CodecError::UnsupportedFormat(ext)),
        }
    }
}

/// Decode an in-memory image file.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, CodecError> {
    let img = image::load_from_memory(bytes).map_err(CodecError::Decode)?;
    let (width, height) = (img.width(), img.height());
    let buffer = if img.color().has_color() {
        PixelBuffer::from_raw(width, height, 3, img.into_rgb8().into_raw())?
    } else {
        PixelBuffer::from_raw(width, height, 1, img.into_luma8().into_raw())?
    };
    Ok(buffer)
}

/// Encode a buffer into the bytes of an image file.
pub fn encode(
    buffer: &PixelBuffer,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, CodecError> {
    let color = match buffer.layout() {
        ChannelLayout::Gray => ExtendedColorType::L8,
        ChannelLayout::Rgb => ExtendedColorType::Rgb8,
    };
    let (width, height) = buffer.dimensions();
    let samples = buffer.as_raw();

    let mut out = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            let quality = quality.value().clamp(1, 100) as u8;
            JpegEncoder::new_with_quality(&mut out, quality)
                .write_image(samples, width, height, color)
        }
        OutputFormat::Png => PngEncoder::new(&mut out).write_image(samples, width, height, color),
        OutputFormat::Bmp => BmpEncoder::new(&mut out).write_image(samples, width, height, color),
    };
    result.map_err(CodecError::Encode)?;
    Ok(out)
}
