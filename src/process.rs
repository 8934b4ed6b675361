//! File-level orchestration: read → decode → filter → encode → write.
//!
//! ## Single file
//!
//! [`process_file`] resolves the effect and the output encoder *before*
//! touching the input, so a bad effect name or output extension fails without
//! decoding anything. The first error is returned as is.
//!
//! ## Batch
//!
//! [`process_batch`] applies one effect to every supported file directly
//! inside a directory (no recursion):
//!
//! ```text
//! photos/                    out/
//! ├── beach.jpg       →      ├── vintage_beach.jpg
//! ├── Scan.BMP        →      ├── vintage_Scan.BMP
//! ├── notes.txt              │   (skipped: not an image extension)
//! └── broken.png             │   (failed: reported, batch continues)
//! ```
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). A
//! per-file failure is recorded in the [`BatchSummary`] and never aborts the
//! rest of the batch. Progress is reported as [`BatchEvent`]s over an optional
//! channel so a single printer thread owns stdout.

use crate::filters::{Filter, FilterError, FilterRegistry};
use crate::imaging::{CodecError, OutputFormat, Quality, decode, encode};
use crate::naming::{is_supported_input, output_filename};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Filter(#[from] FilterError),
}

/// A successfully written output image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub dimensions: (u32, u32),
    pub channels: usize,
}

/// Progress events emitted during batch processing.
///
/// Per-file events arrive in completion order, which varies between runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        effect: String,
        input_dir: PathBuf,
        total: usize,
    },
    Processed(ProcessedImage),
    Failed {
        source: PathBuf,
        error: String,
    },
}

/// Outcome of a batch run. Ordered by file name.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<ProcessedImage>,
    pub failed: Vec<(PathBuf, ProcessError)>,
    /// Top-level files without a supported image extension.
    pub skipped: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Apply `effect` to one file and write the result to `output`.
///
/// The encoder is chosen from `output`'s extension.
pub fn process_file(
    registry: &FilterRegistry,
    effect: &str,
    input: &Path,
    output: &Path,
    quality: Quality,
) -> Result<ProcessedImage, ProcessError> {
    let filter = registry.resolve(effect)?;
    let format = OutputFormat::from_path(output)?;
    run_filter(filter, input, output, format, quality)
}

fn run_filter(
    filter: &dyn Filter,
    input: &Path,
    output: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<ProcessedImage, ProcessError> {
    debug!(effect = filter.name(), input = %input.display(), "processing");
    let bytes = std::fs::read(input)?;
    let decoded = decode(&bytes)?;
    let key = input
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let filtered = filter.apply_keyed(decoded, &key)?;
    let encoded = encode(&filtered, format, quality)?;
    std::fs::write(output, encoded)?;
    debug!(output = %output.display(), "written");

    Ok(ProcessedImage {
        source: input.to_path_buf(),
        output: output.to_path_buf(),
        dimensions: filtered.dimensions(),
        channels: filtered.channels(),
    })
}

/// Partition the top level of `input_dir` into supported images and skipped
/// files, both sorted by file name. Symlinks to files count as files; broken
/// links and links to directories are ignored.
fn collect_inputs(input_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ProcessError> {
    let mut inputs = Vec::new();
    let mut skipped = Vec::new();
    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.into_path();
        if !path.is_file() {
            continue;
        }
        if is_supported_input(&path) {
            inputs.push(path);
        } else {
            skipped.push(path);
        }
    }
    Ok((inputs, skipped))
}

/// Apply `effect` to every supported image in `input_dir`, writing
/// `<effect>_<filename>` files into `output_dir` (created if missing).
///
/// Only an unknown effect or an unreadable `input_dir` fail the whole call;
/// per-file errors land in [`BatchSummary::failed`].
pub fn process_batch(
    registry: &FilterRegistry,
    effect: &str,
    input_dir: &Path,
    output_dir: &Path,
    quality: Quality,
    progress: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, ProcessError> {
    let filter = registry.resolve(effect)?;
    std::fs::create_dir_all(output_dir)?;
    let (inputs, skipped) = collect_inputs(input_dir)?;
    let total = inputs.len();

    info!(effect, input_dir = %input_dir.display(), total, skipped = skipped.len(), "batch started");
    if let Some(tx) = &progress {
        tx.send(BatchEvent::Started {
            effect: effect.to_string(),
            input_dir: input_dir.to_path_buf(),
            total,
        })
        .ok();
    }

    let results: Vec<(PathBuf, Result<ProcessedImage, ProcessError>)> = inputs
        .into_par_iter()
        .map_with(progress, |tx, input| {
            let result = OutputFormat::from_path(&input)
                .map_err(ProcessError::from)
                .and_then(|format| {
                    let filename = input
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let output = output_dir.join(output_filename(effect, &filename));
                    run_filter(filter, &input, &output, format, quality)
                });

            let event = match &result {
                Ok(image) => BatchEvent::Processed(image.clone()),
                Err(e) => {
                    warn!(input = %input.display(), error = %e, "failed to process image");
                    BatchEvent::Failed {
                        source: input.clone(),
                        error: e.to_string(),
                    }
                }
            };
            if let Some(tx) = tx {
                tx.send(event).ok();
            }
            (input, result)
        })
        .collect();

    let mut summary = BatchSummary {
        skipped,
        ..Default::default()
    };
    for (input, result) in results {
        match result {
            Ok(image) => summary.processed.push(image),
            Err(e) => summary.failed.push((input, e)),
        }
    }

    info!(
        processed = summary.processed.len(),
        failed = summary.failed.len(),
        "batch finished"
    );
    Ok(summary)
}
