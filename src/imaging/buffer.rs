//! In-memory 8-bit pixel buffers.
//!
//! A [`PixelBuffer`] is either single-channel grayscale or interleaved RGB.
//! The sample vector length always equals `width * height * channels`; the
//! only way in is [`PixelBuffer::from_raw`] (checked) or one of the
//! constructors that allocate a correctly sized vector.
//!
//! Transforms never mutate a buffer they were handed. They borrow it and
//! return a fresh one, so a buffer passed forward down a pipeline is never
//! observed by an earlier stage again.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("unsupported channel layout: {0} channel(s)")]
    UnsupportedLayout(usize),
    #[error("buffer length {actual} does not match {width}x{height}x{channels}")]
    InvalidLength {
        width: u32,
        height: u32,
        channels: usize,
        actual: usize,
    },
    #[error("image dimensions must be non-zero, got {0}x{1}")]
    ZeroDimension(u32, u32),
}

/// Channel layout of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Gray,
    Rgb,
}

impl ChannelLayout {
    pub fn from_channels(channels: usize) -> Result<Self, BufferError> {
        match channels {
            1 => Ok(Self::Gray),
            3 => Ok(Self::Rgb),
            other => Err(BufferError::UnsupportedLayout(other)),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

/// Round to nearest and clamp into the valid sample range.
///
/// Every arithmetic result that ends up in a buffer goes through here.
#[inline]
pub fn clamp_sample(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// ITU-R 601-2 luma, rounded to nearest.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let l = r as u32 * 299 + g as u32 * 587 + b as u32 * 114;
    ((l + 500) / 1000) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved samples, validating the length invariant.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, BufferError> {
        let layout = ChannelLayout::from_channels(channels)?;
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension(width, height));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(BufferError::InvalidLength {
                width,
                height,
                channels,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// A buffer with every sample set to `value`.
    pub fn filled(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        value: u8,
    ) -> Result<Self, BufferError> {
        let len = width as usize * height as usize * layout.channels();
        Self::from_raw(width, height, layout.channels(), vec![value; len])
    }

    /// A buffer of the same shape as `self` built from a per-sample function.
    pub(crate) fn map_samples(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data: self.data.iter().map(|&s| f(s)).collect(),
        }
    }

    /// A buffer of the same shape as `self` with new samples.
    ///
    /// Callers produce `data` by iterating over `self`, so the length matches.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels();
        let idx = (y as usize * self.width as usize + x as usize) * c;
        &self.data[idx..idx + c]
    }

    fn ensure_same_size(&self, other: &PixelBuffer) -> Result<(), BufferError> {
        if self.dimensions() != other.dimensions() {
            return Err(BufferError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }
}

/// Convert between grayscale and RGB.
///
/// Gray → RGB replicates the sample into all three channels; RGB → Gray uses
/// [`luminance`]. Converting to the current layout returns a copy.
pub fn convert(buffer: &PixelBuffer, target: ChannelLayout) -> PixelBuffer {
    match (buffer.layout, target) {
        (ChannelLayout::Gray, ChannelLayout::Gray) | (ChannelLayout::Rgb, ChannelLayout::Rgb) => {
            buffer.clone()
        }
        (ChannelLayout::Gray, ChannelLayout::Rgb) => PixelBuffer {
            width: buffer.width,
            height: buffer.height,
            layout: ChannelLayout::Rgb,
            data: buffer.data.iter().flat_map(|&l| [l, l, l]).collect(),
        },
        (ChannelLayout::Rgb, ChannelLayout::Gray) => PixelBuffer {
            width: buffer.width,
            height: buffer.height,
            layout: ChannelLayout::Gray,
            data: buffer
                .data
                .chunks_exact(3)
                .map(|p| luminance(p[0], p[1], p[2]))
                .collect(),
        },
    }
}

/// Convert to the layout with `channels` channels.
pub fn convert_to_channels(
    buffer: &PixelBuffer,
    channels: usize,
) -> Result<PixelBuffer, BufferError> {
    Ok(convert(buffer, ChannelLayout::from_channels(channels)?))
}

/// Split an RGB buffer into its red, green and blue planes.
pub fn split(buffer: &PixelBuffer) -> Result<[PixelBuffer; 3], BufferError> {
    if buffer.layout != ChannelLayout::Rgb {
        return Err(BufferError::UnsupportedLayout(buffer.channels()));
    }
    let plane = |offset: usize| PixelBuffer {
        width: buffer.width,
        height: buffer.height,
        layout: ChannelLayout::Gray,
        data: buffer.data.iter().skip(offset).step_by(3).copied().collect(),
    };
    Ok([plane(0), plane(1), plane(2)])
}

/// Interleave three single-channel planes back into an RGB buffer.
pub fn merge(planes: [PixelBuffer; 3]) -> Result<PixelBuffer, BufferError> {
    let [r, g, b] = planes;
    for plane in [&r, &g, &b] {
        if plane.layout != ChannelLayout::Gray {
            return Err(BufferError::UnsupportedLayout(plane.channels()));
        }
    }
    r.ensure_same_size(&g)?;
    r.ensure_same_size(&b)?;

    let mut data = Vec::with_capacity(r.data.len() * 3);
    for ((&rs, &gs), &bs) in r.data.iter().zip(&g.data).zip(&b.data) {
        data.extend_from_slice(&[rs, gs, bs]);
    }
    Ok(PixelBuffer {
        width: r.width,
        height: r.height,
        layout: ChannelLayout::Rgb,
        data,
    })
}

/// Fail unless both buffers share size (`DimensionMismatch`) and layout
/// (`UnsupportedLayout`).
pub(crate) fn ensure_same_shape(a: &PixelBuffer, b: &PixelBuffer) -> Result<(), BufferError> {
    a.ensure_same_size(b)?;
    if a.layout != b.layout {
        return Err(BufferError::UnsupportedLayout(b.channels()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgb, gray};

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = PixelBuffer::from_raw(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, BufferError::InvalidLength { actual: 11, .. }));
    }

    #[test]
    fn from_raw_rejects_unsupported_channel_count() {
        let err = PixelBuffer::from_raw(1, 1, 4, vec![0; 4]).unwrap_err();
        assert_eq!(err, BufferError::UnsupportedLayout(4));
    }

    #[test]
    fn from_raw_rejects_zero_dimensions() {
        let err = PixelBuffer::from_raw(0, 3, 1, vec![]).unwrap_err();
        assert_eq!(err, BufferError::ZeroDimension(0, 3));
    }

    #[test]
    fn clamp_sample_rounds_and_clamps() {
        assert_eq!(clamp_sample(-12.0), 0);
        assert_eq!(clamp_sample(12.4), 12);
        assert_eq!(clamp_sample(12.5), 13);
        assert_eq!(clamp_sample(300.0), 255);
        assert_eq!(clamp_sample(f32::NAN), 0);
    }

    #[test]
    fn luminance_of_neutral_gray_is_unchanged() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(luminance(v, v, v), v);
        }
    }

    #[test]
    fn luminance_weights_green_heaviest() {
        assert_eq!(luminance(255, 0, 0), 76);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 29);
    }

    #[test]
    fn gray_to_rgb_replicates() {
        let g = PixelBuffer::from_raw(2, 1, 1, vec![10, 200]).unwrap();
        let rgb = convert(&g, ChannelLayout::Rgb);
        assert_eq!(rgb.channels(), 3);
        assert_eq!(rgb.as_raw(), &[10, 10, 10, 200, 200, 200]);
    }

    #[test]
    fn rgb_to_gray_uses_luminance() {
        let rgb = PixelBuffer::from_raw(1, 1, 3, vec![255, 0, 0]).unwrap();
        let g = convert(&rgb, ChannelLayout::Gray);
        assert_eq!(g.as_raw(), &[76]);
    }

    #[test]
    fn convert_to_same_layout_is_copy() {
        let rgb = gradient_rgb(5, 3);
        assert_eq!(convert(&rgb, ChannelLayout::Rgb), rgb);
    }

    #[test]
    fn convert_to_channels_rejects_four() {
        let rgb = gradient_rgb(2, 2);
        assert_eq!(
            convert_to_channels(&rgb, 4).unwrap_err(),
            BufferError::UnsupportedLayout(4)
        );
    }

    #[test]
    fn split_then_merge_restores_buffer() {
        let rgb = gradient_rgb(7, 4);
        let planes = split(&rgb).unwrap();
        assert_eq!(planes[0].pixel(3, 2), &[rgb.pixel(3, 2)[0]]);
        assert_eq!(planes[2].pixel(3, 2), &[rgb.pixel(3, 2)[2]]);
        assert_eq!(merge(planes).unwrap(), rgb);
    }

    #[test]
    fn split_rejects_gray() {
        assert_eq!(
            split(&gray(2, 2, 5)).unwrap_err(),
            BufferError::UnsupportedLayout(1)
        );
    }

    #[test]
    fn merge_rejects_mismatched_planes() {
        let err = merge([gray(2, 2, 0), gray(2, 3, 0), gray(2, 2, 0)]).unwrap_err();
        assert_eq!(
            err,
            BufferError::DimensionMismatch {
                expected: (2, 2),
                actual: (2, 3),
            }
        );
    }

    #[test]
    fn merge_rejects_rgb_plane() {
        let rgb = gradient_rgb(2, 2);
        let err = merge([gray(2, 2, 0), rgb, gray(2, 2, 0)]).unwrap_err();
        assert_eq!(err, BufferError::UnsupportedLayout(3));
    }
}
