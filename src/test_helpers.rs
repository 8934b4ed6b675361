//! Shared test utilities for the artfx test suite.
//!
//! Buffer builders for transform tests and on-disk fixtures for the
//! orchestrator tests.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let img = gradient_rgb(8, 8);
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_png(&tmp.path().join("a.png"), &img);
//! ```

use crate::imaging::{ChannelLayout, OutputFormat, PixelBuffer, Quality, encode};
use std::path::Path;

// =========================================================================
// Buffer builders
// =========================================================================

/// Uniform grayscale buffer.
pub fn gray(width: u32, height: u32, value: u8) -> PixelBuffer {
    PixelBuffer::filled(width, height, ChannelLayout::Gray, value).unwrap()
}

/// Uniform RGB buffer.
pub fn rgb(width: u32, height: u32, color: [u8; 3]) -> PixelBuffer {
    let data = color
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 3)
        .collect();
    PixelBuffer::from_raw(width, height, 3, data).unwrap()
}

/// RGB buffer with distinct, non-uniform values in every channel.
pub fn gradient_rgb(width: u32, height: u32) -> PixelBuffer {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            data.push(((x * 37 + y * 11) % 256) as u8);
            data.push(((y * 53 + x * 7) % 256) as u8);
            data.push(((x * y * 5 + 90) % 256) as u8);
        }
    }
    PixelBuffer::from_raw(width, height, 3, data).unwrap()
}

// =========================================================================
// Fixture files
// =========================================================================

/// Encode `buffer` as PNG at `path`, creating parent directories.
pub fn write_png(path: &Path, buffer: &PixelBuffer) {
    write_encoded(path, buffer, OutputFormat::Png);
}

/// Encode `buffer` as JPEG at `path`, creating parent directories.
pub fn write_jpeg(path: &Path, buffer: &PixelBuffer) {
    write_encoded(path, buffer, OutputFormat::Jpeg);
}

fn write_encoded(path: &Path, buffer: &PixelBuffer, format: OutputFormat) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let bytes = encode(buffer, format, Quality::default()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Assert every sample is inside `[lo, hi]`, naming the first offender.
pub fn assert_samples_within(buffer: &PixelBuffer, lo: u8, hi: u8) {
    if let Some((i, s)) = buffer
        .as_raw()
        .iter()
        .enumerate()
        .find(|&(_, &s)| s < lo || s > hi)
    {
        panic!("sample {i} = {s} outside [{lo}, {hi}]");
    }
}
