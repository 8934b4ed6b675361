//! Point and enhancement operators.
//!
//! The enhancers all work the same way: build a *degenerate* version of the
//! image that lacks the property being adjusted, then move each sample away
//! from (factor > 1) or towards (factor < 1) it:
//!
//! ```text
//! out = degenerate + factor * (sample - degenerate)
//! ```
//!
//! | Operator | Degenerate image |
//! |---|---|
//! | [`adjust_saturation`] | grayscale copy, same layout |
//! | [`adjust_contrast`] | uniform image of the mean luminance |
//! | [`adjust_sharpness`] | [`KernelMode::Smooth`] result |
//!
//! A factor of exactly 1.0 reproduces the input.

use super::buffer::{
    BufferError, ChannelLayout, PixelBuffer, clamp_sample, convert, ensure_same_shape, luminance,
};
use super::kernel::{KernelMode, edge_enhance_or_detect};

/// Multiply every sample by `factor`.
pub fn scale_channel(plane: &PixelBuffer, factor: f32) -> PixelBuffer {
    plane.map_samples(|s| clamp_sample(s as f32 * factor))
}

/// `255 - sample` for every sample.
pub fn invert(buffer: &PixelBuffer) -> PixelBuffer {
    buffer.map_samples(|s| 255 - s)
}

fn blend(
    degenerate: &PixelBuffer,
    image: &PixelBuffer,
    factor: f32,
) -> Result<PixelBuffer, BufferError> {
    ensure_same_shape(degenerate, image)?;
    let data = degenerate
        .as_raw()
        .iter()
        .zip(image.as_raw())
        .map(|(&d, &s)| {
            let d = d as f32;
            clamp_sample(d + factor * (s as f32 - d))
        })
        .collect();
    Ok(image.with_data(data))
}

pub fn adjust_saturation(buffer: &PixelBuffer, factor: f32) -> Result<PixelBuffer, BufferError> {
    let degenerate = convert(&convert(buffer, ChannelLayout::Gray), buffer.layout());
    blend(&degenerate, buffer, factor)
}

pub fn adjust_contrast(buffer: &PixelBuffer, factor: f32) -> Result<PixelBuffer, BufferError> {
    let mean = mean_luminance(buffer);
    let degenerate = PixelBuffer::filled(buffer.width(), buffer.height(), buffer.layout(), mean)?;
    blend(&degenerate, buffer, factor)
}

pub fn adjust_sharpness(buffer: &PixelBuffer, factor: f32) -> Result<PixelBuffer, BufferError> {
    let degenerate = edge_enhance_or_detect(buffer, KernelMode::Smooth);
    blend(&degenerate, buffer, factor)
}

/// Mean luminance over all pixels, rounded to nearest.
fn mean_luminance(buffer: &PixelBuffer) -> u8 {
    let raw = buffer.as_raw();
    let (sum, count) = match buffer.layout() {
        ChannelLayout::Gray => (raw.iter().map(|&s| s as u64).sum::<u64>(), raw.len()),
        ChannelLayout::Rgb => (
            raw.chunks_exact(3)
                .map(|p| luminance(p[0], p[1], p[2]) as u64)
                .sum::<u64>(),
            raw.len() / 3,
        ),
    };
    clamp_sample(sum as f32 / count.max(1) as f32)
}
