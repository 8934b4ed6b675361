//! Batch input selection and output file naming.
//!
//! Batch mode only looks at files whose extension is one of
//! [`SUPPORTED_INPUT_EXTENSIONS`], compared case-insensitively:
//! - `IMG_001.JPG` → processed
//! - `scan.bmp` → processed
//! - `notes.txt`, `Makefile` → skipped
//!
//! Each output keeps the input's file name behind an effect prefix, so the
//! encoder is chosen by the original extension:
//! - `vintage` + `beach.jpg` → `vintage_beach.jpg`

use crate::imaging::codec::SUPPORTED_INPUT_EXTENSIONS;
use std::path::Path;

/// `<effect>_<filename>`.
pub fn output_filename(effect: &str, filename: &str) -> String {
    format!("{effect}_{filename}")
}

/// Whether batch mode should pick up `path`, judged by extension alone.
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_INPUT_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}
