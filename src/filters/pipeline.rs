//! Linear stage pipelines.
//!
//! A [`Pipeline`] is data: a name, an ordered list of [`Stage`]s, and an
//! optional grain seed. [`Filter::apply_keyed`] folds the buffer through the stages;
//! each stage consumes the previous stage's output and nothing else. There is
//! no branching and no going back.
//!
//! ## Randomness
//!
//! Only [`Stage::Grain`] draws random numbers. Without a seed every call
//! samples fresh grain from OS entropy. With one, the RNG is seeded from the
//! pipeline seed mixed with the image key, so each image gets its own grain
//! and rerunning over the same file reproduces it byte for byte.

use super::{Filter, FilterError, FilterKind};
use crate::imaging::{
    self, BufferError, ChannelLayout, KernelMode, PixelBuffer, convert, edge_enhance_or_detect,
    gaussian_blur,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::trace;

/// One step of a pipeline, with its parameters baked in.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Convert to the given layout (no-op when already there).
    Layout(ChannelLayout),
    Kernel(KernelMode),
    GaussianBlur { radius: f32 },
    Sharpness(f32),
    Contrast(f32),
    Saturation(f32),
    /// Split into planes, scale R/G/B independently, merge back.
    ScaleChannels([f32; 3]),
    Invert,
    /// Generate grain at the image size and screen-blend it on.
    Grain,
    /// Generate a vignette mask at the image size and multiply it in.
    Vignette { min_intensity: f32, falloff: f32 },
}

impl Stage {
    /// Short stable identifier, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Layout(ChannelLayout::Rgb) => "ensure-rgb",
            Stage::Layout(ChannelLayout::Gray) => "grayscale",
            Stage::Kernel(mode) => mode.name(),
            Stage::GaussianBlur { .. } => "gaussian-blur",
            Stage::Sharpness(_) => "sharpness",
            Stage::Contrast(_) => "contrast",
            Stage::Saturation(_) => "saturation",
            Stage::ScaleChannels(_) => "scale-channels",
            Stage::Invert => "invert",
            Stage::Grain => "grain",
            Stage::Vignette { .. } => "vignette",
        }
    }

    fn run(
        &self,
        buffer: PixelBuffer,
        rng: &mut Option<StdRng>,
        seed: Option<u64>,
    ) -> Result<PixelBuffer, BufferError> {
        match self {
            Stage::Layout(layout) => Ok(convert(&buffer, *layout)),
            Stage::Kernel(mode) => Ok(edge_enhance_or_detect(&buffer, *mode)),
            Stage::GaussianBlur { radius } => Ok(gaussian_blur(&buffer, *radius)),
            Stage::Sharpness(f) => imaging::adjust_sharpness(&buffer, *f),
            Stage::Contrast(f) => imaging::adjust_contrast(&buffer, *f),
            Stage::Saturation(f) => imaging::adjust_saturation(&buffer, *f),
            Stage::ScaleChannels(factors) => {
                let [r, g, b] = imaging::split(&buffer)?;
                imaging::merge([
                    imaging::scale_channel(&r, factors[0]),
                    imaging::scale_channel(&g, factors[1]),
                    imaging::scale_channel(&b, factors[2]),
                ])
            }
            Stage::Invert => Ok(imaging::invert(&buffer)),
            Stage::Grain => {
                let rng = rng.get_or_insert_with(|| match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                });
                let grain = imaging::generate_grain(buffer.width(), buffer.height(), rng)?;
                imaging::screen_blend(&buffer, &grain)
            }
            Stage::Vignette {
                min_intensity,
                falloff,
            } => {
                let mask = imaging::generate_vignette_mask(
                    buffer.width(),
                    buffer.height(),
                    *min_intensity,
                    *falloff,
                );
                imaging::apply_mask(&buffer, &mask)
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::GaussianBlur { radius } => write!(f, "{}({radius})", self.name()),
            Stage::Sharpness(v) | Stage::Contrast(v) | Stage::Saturation(v) => {
                write!(f, "{}({v})", self.name())
            }
            Stage::ScaleChannels([r, g, b]) => write!(f, "{}(r={r}, g={g}, b={b})", self.name()),
            Stage::Vignette {
                min_intensity,
                falloff,
            } => write!(f, "{}(min={min_intensity}, falloff={falloff})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Per-image RNG seed: the pipeline seed XOR a 64-bit FNV-1a hash of the key.
/// An empty key leaves the seed unchanged.
fn stream_seed(seed: u64, image_key: &str) -> u64 {
    if image_key.is_empty() {
        return seed;
    }
    let hash = image_key
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        });
    seed ^ hash
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<Stage>,
    grain_seed: Option<u64>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
            grain_seed: None,
        }
    }

    /// Fix the grain RNG seed so every run over the same image key produces
    /// the same output.
    pub fn with_grain_seed(mut self, seed: Option<u64>) -> Self {
        self.grain_seed = seed;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The built-in pipeline for `kind`.
    pub fn for_kind(kind: FilterKind) -> Self {
        use ChannelLayout::{Gray, Rgb};

        let stages = match kind {
            FilterKind::Enhance => vec![
                Stage::Layout(Rgb),
                Stage::Sharpness(1.2),
                Stage::Contrast(1.1),
                Stage::Saturation(1.05),
            ],
            FilterKind::Oil => vec![
                Stage::Layout(Rgb),
                Stage::Kernel(KernelMode::EnhanceMore),
                Stage::Kernel(KernelMode::Smooth),
            ],
            FilterKind::Sketch => vec![
                Stage::Layout(Gray),
                Stage::Kernel(KernelMode::FindEdges),
                Stage::Invert,
            ],
            FilterKind::Watercolor => vec![
                Stage::Layout(Rgb),
                Stage::Kernel(KernelMode::SmoothMore),
                Stage::Kernel(KernelMode::Enhance),
                Stage::GaussianBlur { radius: 1.0 },
            ],
            // Grain goes on before the vignette so the corners darken the grain too.
            FilterKind::Vintage => vec![
                Stage::Layout(Rgb),
                Stage::Saturation(0.8),
                Stage::ScaleChannels([1.1, 1.05, 1.0]),
                Stage::GaussianBlur { radius: 0.5 },
                Stage::Grain,
                Stage::Vignette {
                    min_intensity: 0.3,
                    falloff: 0.7,
                },
            ],
        };
        Self::new(kind.name(), stages)
    }
}

impl Filter for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply_keyed(
        &self,
        buffer: PixelBuffer,
        image_key: &str,
    ) -> Result<PixelBuffer, FilterError> {
        let seed = self.grain_seed.map(|seed| stream_seed(seed, image_key));
        let mut rng = None;
        self.stages.iter().try_fold(buffer, |buffer, stage| {
            trace!(
                filter = %self.name,
                stage = %stage,
                width = buffer.width(),
                height = buffer.height(),
                "stage"
            );
            stage
                .run(buffer, &mut rng, seed)
                .map_err(|source| FilterError::Stage {
                    filter: self.name.clone(),
                    stage: stage.name(),
                    source,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{generate_grain, generate_vignette_mask, invert, screen_blend};
    use crate::test_helpers::{assert_samples_within, gradient_rgb, gray, rgb};

    fn run(kind: FilterKind, input: PixelBuffer) -> PixelBuffer {
        Pipeline::for_kind(kind)
            .with_grain_seed(Some(11))
            .apply(input)
            .unwrap()
    }

    #[test]
    fn enhance_neutral_gray_stays_near_gray() {
        let out = run(FilterKind::Enhance, rgb(4, 4, [128, 128, 128]));
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.channels(), 3);
        assert_samples_within(&out, 118, 138);
    }

    #[test]
    fn enhance_promotes_gray_input_to_rgb() {
        let out = run(FilterKind::Enhance, gray(5, 5, 40));
        assert_eq!(out.layout(), ChannelLayout::Rgb);
    }

    #[test]
    fn sketch_is_single_channel_and_inverts_edges() {
        let input = gradient_rgb(2, 2);
        let pipeline = Pipeline::for_kind(FilterKind::Sketch);

        // Everything before the final invert stage.
        let [to_gray, edges, last] = pipeline.stages() else {
            panic!("sketch should have three stages");
        };
        assert_eq!(last, &Stage::Invert);
        let mut none = None;
        let gray = to_gray.run(input.clone(), &mut none, None).unwrap();
        let intermediate = edges.run(gray, &mut none, None).unwrap();
        assert_eq!(intermediate.layout(), ChannelLayout::Gray);

        let out = pipeline.apply(input).unwrap();
        assert_eq!(out.layout(), ChannelLayout::Gray);
        assert_eq!(invert(&out), intermediate);
    }

    #[test]
    fn sketch_of_flat_image_is_white_inside() {
        let out = run(FilterKind::Sketch, rgb(6, 6, [10, 200, 30]));
        assert_eq!(out.pixel(2, 3), &[255]);
    }

    #[test]
    fn oil_and_watercolor_keep_shape() {
        for kind in [FilterKind::Oil, FilterKind::Watercolor] {
            let out = run(kind, gradient_rgb(9, 7));
            assert_eq!(out.dimensions(), (9, 7));
            assert_eq!(out.channels(), 3);
        }
    }

    #[test]
    fn watercolor_flat_image_is_unchanged() {
        let img = rgb(8, 8, [30, 60, 90]);
        assert_eq!(run(FilterKind::Watercolor, img.clone()), img);
    }

    #[test]
    fn vintage_with_seed_is_reproducible() {
        let a = run(FilterKind::Vintage, gradient_rgb(12, 10));
        let b = run(FilterKind::Vintage, gradient_rgb(12, 10));
        assert_eq!(a, b);
    }

    #[test]
    fn vintage_seeded_grain_differs_per_image_key() {
        let pipeline = Pipeline::for_kind(FilterKind::Vintage).with_grain_seed(Some(7));
        let input = rgb(8, 8, [0, 0, 0]);
        let a = pipeline.apply_keyed(input.clone(), "a.png").unwrap();
        let b = pipeline.apply_keyed(input.clone(), "b.png").unwrap();
        let a_again = pipeline.apply_keyed(input, "a.png").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }

    #[test]
    fn stream_seed_mixes_key() {
        assert_eq!(stream_seed(42, ""), 42);
        assert_ne!(stream_seed(42, "a.png"), stream_seed(42, "b.png"));
        assert_eq!(stream_seed(42, "a.png"), stream_seed(42, "a.png"));
    }

    #[test]
    fn vintage_without_seed_varies() {
        let pipeline = Pipeline::for_kind(FilterKind::Vintage);
        let a = pipeline.apply(rgb(32, 32, [120, 120, 120])).unwrap();
        let b = pipeline.apply(rgb(32, 32, [120, 120, 120])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn vintage_matches_hand_composed_stages() {
        let input = gradient_rgb(15, 9);
        let seed = 1234;

        let rgb_in = convert(&input, ChannelLayout::Rgb);
        let desat = imaging::adjust_saturation(&rgb_in, 0.8).unwrap();
        let [r, g, b] = imaging::split(&desat).unwrap();
        let warm = imaging::merge([
            imaging::scale_channel(&r, 1.1),
            imaging::scale_channel(&g, 1.05),
            b,
        ])
        .unwrap();
        let soft = gaussian_blur(&warm, 0.5);
        let grain = generate_grain(15, 9, &mut StdRng::seed_from_u64(seed)).unwrap();
        let grained = screen_blend(&soft, &grain).unwrap();
        let mask = generate_vignette_mask(15, 9, 0.3, 0.7);
        let expected = imaging::apply_mask(&grained, &mask).unwrap();

        let actual = Pipeline::for_kind(FilterKind::Vintage)
            .with_grain_seed(Some(seed))
            .apply(input)
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn vintage_centre_keeps_brightness_corners_darken() {
        let out = run(FilterKind::Vintage, rgb(21, 21, [150, 150, 150]));
        let centre = out.pixel(10, 10);
        let corner = out.pixel(0, 0);
        for c in 0..3 {
            assert!(corner[c] < centre[c]);
        }
        // Warm grading: red scaled up most, blue untouched before grain.
        assert!(centre[0] >= centre[2]);
    }

    #[test]
    fn vintage_grain_stage_is_before_vignette() {
        let stages = Pipeline::for_kind(FilterKind::Vintage).stages().to_vec();
        let grain = stages.iter().position(|s| *s == Stage::Grain).unwrap();
        let vignette = stages
            .iter()
            .position(|s| matches!(s, Stage::Vignette { .. }))
            .unwrap();
        assert!(grain < vignette);
    }

    #[test]
    fn every_builtin_output_is_valid() {
        for kind in FilterKind::ALL {
            let out = run(kind, gradient_rgb(10, 10));
            let expected = out.width() as usize * out.height() as usize * out.channels();
            assert_eq!(out.as_raw().len(), expected, "{kind}");
        }
    }

    #[test]
    fn stage_error_names_filter_and_stage() {
        // Channel scaling needs RGB; a gray input without an ensure-rgb stage fails.
        let pipeline = Pipeline::new("broken", vec![Stage::ScaleChannels([1.0; 3])]);
        let err = pipeline.apply(gray(2, 2, 0)).unwrap_err();
        match err {
            FilterError::Stage {
                filter,
                stage,
                source,
            } => {
                assert_eq!(filter, "broken");
                assert_eq!(stage, "scale-channels");
                assert_eq!(source, BufferError::UnsupportedLayout(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stage_display_includes_parameters() {
        assert_eq!(Stage::Saturation(0.8).to_string(), "saturation(0.8)");
        assert_eq!(
            Stage::Vignette {
                min_intensity: 0.3,
                falloff: 0.7
            }
            .to_string(),
            "vignette(min=0.3, falloff=0.7)"
        );
        assert_eq!(Stage::Kernel(KernelMode::FindEdges).to_string(), "find-edges");
    }
}
