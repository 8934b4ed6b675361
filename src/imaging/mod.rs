//! Pixel buffers and the primitive operations filters are built from.
//!
//! | Operation | Function |
//! |---|---|
//! | **Layout** | [`convert`], [`split`], [`merge`] |
//! | **Convolution** | [`edge_enhance_or_detect`], [`gaussian_blur`] |
//! | **Enhancement** | [`adjust_saturation`], [`adjust_contrast`], [`adjust_sharpness`] |
//! | **Point ops** | [`scale_channel`], [`invert`] |
//! | **Textures** | [`generate_grain`], [`generate_vignette_mask`], [`screen_blend`], [`apply_mask`] |
//! | **Codec** | [`decode`], [`encode`] (`image` crate) |
//!
//! The module is split into:
//! - **Buffer**: [`PixelBuffer`] and channel layout conversions
//! - **Kernel**: fixed-kernel convolution and Gaussian blur
//! - **Adjust**: enhancers and per-sample operators
//! - **Texture**: procedural grain / vignette and their compositing
//! - **Codec**: encoded bytes in and out

pub mod adjust;
pub mod buffer;
pub mod codec;
pub mod kernel;
pub mod texture;

pub use adjust::{adjust_contrast, adjust_saturation, adjust_sharpness, invert, scale_channel};
pub use buffer::{
    BufferError, ChannelLayout, PixelBuffer, clamp_sample, convert, convert_to_channels, merge,
    split,
};
pub use codec::{CodecError, OutputFormat, Quality, decode, encode};
pub use kernel::{KernelMode, edge_enhance_or_detect, gaussian_blur};
pub use texture::{
    GRAIN_LEVELS, VignetteMask, apply_mask, generate_grain, generate_vignette_mask, screen_blend,
};
