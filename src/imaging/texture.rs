//! Procedural textures and the compositing operators that consume them.
//!
//! - [`generate_grain`]: uniform RGB noise in `[0, GRAIN_LEVELS)` for film grain.
//! - [`generate_vignette_mask`]: radial falloff from the image centre.
//! - [`screen_blend`]: `a + b - a*b/255`, which never darkens either input.
//! - [`apply_mask`]: multiply every channel of a pixel by its mask value.
//!
//! Textures depend only on the target dimensions (and the RNG for grain).
//! They are built per image and dropped once composited.

use super::buffer::{BufferError, ChannelLayout, PixelBuffer, clamp_sample, ensure_same_shape};
use rand::Rng;

/// Grain samples are drawn from `0..GRAIN_LEVELS`.
pub const GRAIN_LEVELS: u8 = 30;

/// Uniform RGB noise with every sample in `[0, GRAIN_LEVELS)`.
///
/// The caller owns the RNG: pass a seeded `StdRng` for reproducible grain.
pub fn generate_grain(
    width: u32,
    height: u32,
    rng: &mut impl Rng,
) -> Result<PixelBuffer, BufferError> {
    let len = width as usize * height as usize * ChannelLayout::Rgb.channels();
    let data = (0..len).map(|_| rng.gen_range(0..GRAIN_LEVELS)).collect();
    PixelBuffer::from_raw(width, height, ChannelLayout::Rgb.channels(), data)
}

/// Per-pixel intensity multipliers, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct VignetteMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl VignetteMask {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Evenly spaced coordinate in `[-1, 1]` for index `i` of `len`.
///
/// A single-pixel axis sits on the centre line.
fn normalized_coord(i: u32, len: u32) -> f32 {
    if len <= 1 {
        return 0.0;
    }
    -1.0 + 2.0 * i as f32 / (len - 1) as f32
}

/// Radial vignette: `clamp(1 - falloff * r, min_intensity, 1.0)` where `r` is
/// the distance from the centre in normalized `[-1, 1]` coordinates.
pub fn generate_vignette_mask(
    width: u32,
    height: u32,
    min_intensity: f32,
    falloff: f32,
) -> VignetteMask {
    let mut values = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        let ny = normalized_coord(y, height);
        for x in 0..width {
            let nx = normalized_coord(x, width);
            let distance = (nx * nx + ny * ny).sqrt();
            values.push((1.0 - falloff * distance).clamp(min_intensity, 1.0));
        }
    }
    VignetteMask {
        width,
        height,
        values,
    }
}

/// Screen-mode composite of `overlay` onto `base`.
pub fn screen_blend(base: &PixelBuffer, overlay: &PixelBuffer) -> Result<PixelBuffer, BufferError> {
    ensure_same_shape(base, overlay)?;
    let data = base
        .as_raw()
        .iter()
        .zip(overlay.as_raw())
        .map(|(&b, &o)| {
            let (b, o) = (b as f32, o as f32);
            clamp_sample(b + o - b * o / 255.0)
        })
        .collect();
    Ok(base.with_data(data))
}

/// Multiply each pixel by its mask value, broadcast across channels.
pub fn apply_mask(buffer: &PixelBuffer, mask: &VignetteMask) -> Result<PixelBuffer, BufferError> {
    if buffer.dimensions() != mask.dimensions() {
        return Err(BufferError::DimensionMismatch {
            expected: buffer.dimensions(),
            actual: mask.dimensions(),
        });
    }
    let channels = buffer.channels();
    let data = buffer
        .as_raw()
        .chunks_exact(channels)
        .zip(&mask.values)
        .flat_map(|(pixel, &m)| pixel.iter().map(move |&s| clamp_sample(s as f32 * m)))
        .collect();
    Ok(buffer.with_data(data))
}
