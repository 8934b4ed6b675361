//! CLI output formatting.
//!
//! Every `format_*` function is pure and returns display lines; the matching
//! `print_*` wrapper writes them to stdout. Logging goes through `tracing` to
//! stderr and never through here.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! vintage: beach.jpg → out.jpg (640x480, rgb)
//! ```
//!
//! ## Batch
//!
//! ```text
//! vintage: 3 images in photos/
//!     beach.jpg → vintage_beach.jpg
//!     Scan.BMP → vintage_Scan.BMP
//!     broken.png: failed to decode image: ...
//! Processed 2 of 3 images (1 failed, 1 skipped)
//! ```
//!
//! Per-file lines appear as workers finish, not in directory order.
//!
//! ## List
//!
//! ```text
//! enhance      Gentle sharpness, contrast and colour boost
//!     ensure-rgb → sharpness(1.2) → contrast(1.1) → saturation(1.05)
//! ```

use crate::filters::{FilterKind, Pipeline};
use crate::process::{BatchEvent, BatchSummary, ProcessedImage};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn layout_label(channels: usize) -> &'static str {
    if channels == 1 { "gray" } else { "rgb" }
}

/// Indentation prefix: 4 spaces per level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Apply
// ============================================================================

pub fn format_apply_result(effect: &str, image: &ProcessedImage) -> String {
    let (w, h) = image.dimensions;
    format!(
        "{}: {} \u{2192} {} ({}x{}, {})",
        effect,
        file_name(&image.source),
        image.output.display(),
        w,
        h,
        layout_label(image.channels)
    )
}

pub fn print_apply_result(effect: &str, image: &ProcessedImage) {
    println!("{}", format_apply_result(effect, image));
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            effect,
            input_dir,
            total,
        } => vec![format!(
            "{}: {} images in {}",
            effect,
            total,
            input_dir.display()
        )],
        BatchEvent::Processed(image) => vec![format!(
            "{}{} \u{2192} {}",
            indent(1),
            file_name(&image.source),
            file_name(&image.output)
        )],
        BatchEvent::Failed { source, error } => vec![format!(
            "{}{}: {}",
            indent(1),
            file_name(source),
            error
        )],
    }
}

/// One-line summary printed after a batch completes.
pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let mut line = format!(
        "Processed {} of {} images",
        summary.processed.len(),
        summary.total()
    );
    let mut notes = Vec::new();
    if !summary.failed.is_empty() {
        notes.push(format!("{} failed", summary.failed.len()));
    }
    if !summary.skipped.is_empty() {
        notes.push(format!("{} skipped", summary.skipped.len()));
    }
    if !notes.is_empty() {
        line.push_str(&format!(" ({})", notes.join(", ")));
    }
    line
}

pub fn print_batch_summary(summary: &BatchSummary) {
    println!("{}", format_batch_summary(summary));
}

// ============================================================================
// List
// ============================================================================

/// Every built-in filter with its description and stage chain.
pub fn format_filter_list() -> Vec<String> {
    let mut kinds = FilterKind::ALL;
    kinds.sort_by_key(|k| k.name());

    let mut lines = Vec::new();
    for kind in kinds {
        lines.push(format!("{:<12} {}", kind.name(), kind.description()));
        let stages: Vec<String> = Pipeline::for_kind(kind)
            .stages()
            .iter()
            .map(|s| s.to_string())
            .collect();
        lines.push(format!("{}{}", indent(1), stages.join(" \u{2192} ")));
    }
    lines
}

pub fn print_filter_list() {
    for line in format_filter_list() {
        println!("{}", line);
    }
}
