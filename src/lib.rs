//! # artfx
//!
//! Deterministic artistic filters for photographs. One image in, one styled
//! image out, with a small closed set of named effects: `vintage`,
//! `watercolor`, `oil`, `sketch` and `enhance`.
//!
//! # Architecture: Three Layers
//!
//! ```text
//! imaging    PixelBuffer + pure transforms   (no I/O, no names)
//! filters    Stage pipelines + registry      (name → Filter)
//! process    read → decode → filter → encode → write, single file or batch
//! ```
//!
//! Each layer only calls downward. Transforms never touch the filesystem, so
//! every filter can be tested on in-memory buffers, and the orchestrator can be
//! tested with tiny fixture files in a temp directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel buffers, convolution, enhancers, grain and vignette, codecs |
//! | [`filters`] | `Filter` trait, `Stage` pipelines for the built-in effects, `FilterRegistry` |
//! | [`process`] | Single-file and parallel batch orchestration with progress events |
//! | [`naming`] | Batch input filtering and `<effect>_<filename>` output naming |
//! | [`config`] | Optional `artfx.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Filters Are Data
//!
//! A built-in filter is a [`filters::Pipeline`]: a list of [`filters::Stage`]
//! values with their parameters baked in. Dispatch is a registry lookup, not a
//! chain of string comparisons, and `artfx list` can print exactly what each
//! filter does.
//!
//! ## Filter Identity Comes From The Caller Only
//!
//! The effect is named on the command line and resolved against a closed set.
//! Nothing about the filter is ever read from image metadata or other input
//! bytes, and there is no process-wide "current filter".
//!
//! ## Explicit Randomness
//!
//! Film grain is the only random element. The RNG is created per call,
//! either from OS entropy or from `--seed` mixed with the image's file name.
//! Seeded runs reproduce vintage output byte for byte, and two images in the
//! same batch still get different grain.
//!
//! ## Rounding, Not Truncation
//!
//! Every floating-point intermediate goes back to `u8` through
//! [`imaging::clamp_sample`]: round to nearest, clamp to `[0, 255]`. Screen
//! blending is clamped too, so bright pixels never wrap around to dark.

pub mod config;
pub mod filters;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
