//! Convolution transforms: fixed 3×3 / 5×5 kernels and separable Gaussian blur.
//!
//! | Mode | Size | Weights | Divisor |
//! |---|---|---|---|
//! | [`KernelMode::Enhance`] | 3×3 | centre 10, ring −1 | 2 |
//! | [`KernelMode::EnhanceMore`] | 3×3 | centre 9, ring −1 | 1 |
//! | [`KernelMode::Smooth`] | 3×3 | centre 5, ring 1 | 13 |
//! | [`KernelMode::SmoothMore`] | 5×5 | centre 44, inner ring 5, outer ring 1 | 100 |
//! | [`KernelMode::FindEdges`] | 3×3 | centre 8, ring −1 | 1 |
//!
//! Fixed kernels leave a border as wide as the kernel radius untouched: those
//! pixels are copied from the input. An image smaller than the kernel passes
//! through unchanged. The Gaussian blur clamps coordinates at the edges instead,
//! so every pixel is blurred.
//!
//! Rows are processed in parallel with rayon; the result does not depend on
//! scheduling.

use super::buffer::{PixelBuffer, clamp_sample};
use rayon::prelude::*;

/// Which fixed kernel [`edge_enhance_or_detect`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelMode {
    Enhance,
    EnhanceMore,
    Smooth,
    SmoothMore,
    FindEdges,
}

impl KernelMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Enhance => "enhance",
            Self::EnhanceMore => "enhance-more",
            Self::Smooth => "smooth",
            Self::SmoothMore => "smooth-more",
            Self::FindEdges => "find-edges",
        }
    }

    fn kernel(self) -> Kernel {
        match self {
            Self::Enhance => Kernel::ring3(10, -1, 2),
            Self::EnhanceMore => Kernel::ring3(9, -1, 1),
            Self::Smooth => Kernel::ring3(5, 1, 13),
            Self::FindEdges => Kernel::ring3(8, -1, 1),
            Self::SmoothMore => {
                #[rustfmt::skip]
                let weights = vec![
                    1, 1,  1, 1, 1,
                    1, 5,  5, 5, 1,
                    1, 5, 44, 5, 1,
                    1, 5,  5, 5, 1,
                    1, 1,  1, 1, 1,
                ];
                Kernel {
                    size: 5,
                    weights,
                    divisor: 100,
                }
            }
        }
    }
}

/// Square integer kernel with a divisor applied after accumulation.
#[derive(Debug, Clone)]
struct Kernel {
    size: usize,
    weights: Vec<i32>,
    divisor: i32,
}

impl Kernel {
    /// 3×3 kernel with one weight in the centre and another on the ring.
    fn ring3(centre: i32, ring: i32, divisor: i32) -> Self {
        let mut weights = vec![ring; 9];
        weights[4] = centre;
        Self {
            size: 3,
            weights,
            divisor,
        }
    }
}

/// Convolve with one of the fixed kernels.
pub fn edge_enhance_or_detect(buffer: &PixelBuffer, mode: KernelMode) -> PixelBuffer {
    convolve(buffer, &mode.kernel())
}

fn convolve(buffer: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let channels = buffer.channels();
    let radius = kernel.size / 2;

    if width < kernel.size || height < kernel.size {
        return buffer.clone();
    }

    let src = buffer.as_raw();
    let mut out = src.to_vec();
    let row_len = width * channels;
    let divisor = kernel.divisor as f32;

    out.par_chunks_mut(row_len)
        .enumerate()
        .skip(radius)
        .take(height - 2 * radius)
        .for_each(|(y, row)| {
            for x in radius..width - radius {
                for c in 0..channels {
                    let mut acc = 0i32;
                    for ky in 0..kernel.size {
                        let sy = y + ky - radius;
                        for kx in 0..kernel.size {
                            let sx = x + kx - radius;
                            let sample = src[(sy * width + sx) * channels + c] as i32;
                            acc += kernel.weights[ky * kernel.size + kx] * sample;
                        }
                    }
                    row[x * channels + c] = clamp_sample(acc as f32 / divisor);
                }
            }
        });

    buffer.with_data(out)
}

/// Normalized 1D Gaussian weights for standard deviation `sigma`.
///
/// Half-width is `ceil(3σ)`, so the kernel length is always odd.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 || sigma.is_nan() {
        return vec![1.0];
    }
    let half = (sigma * 3.0).ceil() as isize;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let x = i as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}

/// Separable Gaussian blur with σ = `radius`.
///
/// A radius of zero (or negative / NaN) returns the input unchanged.
pub fn gaussian_blur(buffer: &PixelBuffer, radius: f32) -> PixelBuffer {
    if radius <= 0.0 || radius.is_nan() {
        return buffer.clone();
    }

    let kernel = gaussian_kernel_1d(radius);
    let half = (kernel.len() / 2) as isize;
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let channels = buffer.channels();
    let row_len = width * channels;
    let src = buffer.as_raw();

    let clamp_index = |i: isize, len: usize| i.clamp(0, len as isize - 1) as usize;

    // Horizontal pass into f32 to avoid rounding twice.
    let mut horizontal = vec![0f32; src.len()];
    horizontal
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                for c in 0..channels {
                    let mut acc = 0f32;
                    for (k, w) in kernel.iter().enumerate() {
                        let sx = clamp_index(x as isize + k as isize - half, width);
                        acc += w * src[(y * width + sx) * channels + c] as f32;
                    }
                    row[x * channels + c] = acc;
                }
            }
        });

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        for x in 0..width {
            for c in 0..channels {
                let mut acc = 0f32;
                for (k, w) in kernel.iter().enumerate() {
                    let sy = clamp_index(y as isize + k as isize - half, height);
                    acc += w * horizontal[(sy * width + x) * channels + c];
                }
                row[x * channels + c] = clamp_sample(acc);
            }
        }
    });

    buffer.with_data(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgb, gray, rgb};

    const ALL_MODES: [KernelMode; 5] = [
        KernelMode::Enhance,
        KernelMode::EnhanceMore,
        KernelMode::Smooth,
        KernelMode::SmoothMore,
        KernelMode::FindEdges,
    ];

    #[test]
    fn kernel_weights_sum_to_divisor_except_find_edges() {
        for mode in ALL_MODES {
            let k = mode.kernel();
            assert_eq!(k.weights.len(), k.size * k.size);
            let sum: i32 = k.weights.iter().sum();
            if mode == KernelMode::FindEdges {
                assert_eq!(sum, 0);
            } else {
                assert_eq!(sum, k.divisor, "{}", mode.name());
            }
        }
    }

    #[test]
    fn uniform_image_unchanged_by_normalized_kernels() {
        let img = rgb(6, 6, [90, 120, 200]);
        for mode in ALL_MODES {
            if mode == KernelMode::FindEdges {
                continue;
            }
            assert_eq!(edge_enhance_or_detect(&img, mode), img, "{}", mode.name());
        }
    }

    #[test]
    fn find_edges_zeroes_uniform_interior() {
        let img = gray(5, 5, 77);
        let edges = edge_enhance_or_detect(&img, KernelMode::FindEdges);
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(edges.pixel(x, y), &[0]);
            }
        }
        // Border copied through.
        assert_eq!(edges.pixel(0, 0), &[77]);
        assert_eq!(edges.pixel(4, 2), &[77]);
    }

    #[test]
    fn find_edges_detects_step() {
        let mut data = vec![0u8; 25];
        for y in 0..5 {
            for x in 3..5 {
                data[y * 5 + x] = 200;
            }
        }
        let img = PixelBuffer::from_raw(5, 5, 1, data).unwrap();
        let edges = edge_enhance_or_detect(&img, KernelMode::FindEdges);
        // Left of the step sees negative response → 0; right side is bright.
        assert_eq!(edges.pixel(2, 2), &[0]);
        assert_eq!(edges.pixel(3, 2), &[255]);
    }

    #[test]
    fn image_smaller_than_kernel_passes_through() {
        let img = gradient_rgb(2, 2);
        assert_eq!(edge_enhance_or_detect(&img, KernelMode::FindEdges), img);
        let img = gradient_rgb(4, 4);
        assert_eq!(edge_enhance_or_detect(&img, KernelMode::SmoothMore), img);
    }

    #[test]
    fn enhance_more_saturates_output() {
        let mut data = vec![0u8; 9];
        data[4] = 255;
        let img = PixelBuffer::from_raw(3, 3, 1, data).unwrap();
        let out = edge_enhance_or_detect(&img, KernelMode::EnhanceMore);
        assert_eq!(out.pixel(1, 1), &[255]);
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel_1d(1.0);
        assert_eq!(k.len(), 7);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(k[0], k[6]);
        assert!(k[3] > k[2]);
    }

    #[test]
    fn gaussian_kernel_zero_sigma_is_delta() {
        assert_eq!(gaussian_kernel_1d(0.0), vec![1.0]);
    }

    #[test]
    fn gaussian_blur_radius_zero_is_identity() {
        let img = gradient_rgb(9, 7);
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn gaussian_blur_keeps_uniform_image() {
        let img = rgb(5, 4, [128, 64, 250]);
        assert_eq!(gaussian_blur(&img, 1.0), img);
    }

    #[test]
    fn gaussian_blur_spreads_single_bright_pixel() {
        let mut data = vec![0u8; 49];
        data[24] = 255;
        let img = PixelBuffer::from_raw(7, 7, 1, data).unwrap();
        let out = gaussian_blur(&img, 1.0);
        let centre = out.pixel(3, 3)[0];
        let neighbour = out.pixel(4, 3)[0];
        assert!(centre < 255);
        assert!(neighbour > 0);
        assert!(centre > neighbour);
        assert_eq!(out.pixel(2, 3), out.pixel(4, 3));
    }
}
