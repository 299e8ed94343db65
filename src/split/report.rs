//! Split report types.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::Bucket;

/// Outcome of a train/validation split.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Ratio actually used, after any fallback.
    pub train_ratio: f64,
    pub seed: Option<u64>,
    /// Number of image/label pairs discovered.
    pub pairs_found: usize,
    /// Images skipped because no label file matched.
    pub unmatched_images: usize,
    /// Images skipped because another image already claimed their stem.
    pub duplicate_images: usize,
    /// Pairs copied into `train/`.
    pub train_count: usize,
    /// Pairs copied into `valid/`.
    pub valid_count: usize,
    /// Pairs that failed to copy and appear in neither bucket.
    pub failures: Vec<CopyFailure>,
}

impl SplitReport {
    /// `(train_count, valid_count)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.train_count, self.valid_count)
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dataset split ===")?;
        writeln!(f, "Image/label pairs: {}", self.pairs_found)?;
        if self.unmatched_images > 0 {
            writeln!(f, "Images without labels (skipped): {}", self.unmatched_images)?;
        }
        if self.duplicate_images > 0 {
            writeln!(f, "Images with duplicate stems (skipped): {}", self.duplicate_images)?;
        }
        writeln!(
            f,
            "Train: {} ({:.0}%)",
            self.train_count,
            self.train_ratio * 100.0
        )?;
        writeln!(
            f,
            "Valid: {} ({:.0}%)",
            self.valid_count,
            (1.0 - self.train_ratio) * 100.0
        )?;

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed copies ({}):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  - {}", failure)?;
            }
        }

        writeln!(f, "Output: {}", self.output_dir.display())
    }
}

/// A pair that could not be copied into its bucket.
#[derive(Clone, Debug, Serialize)]
pub struct CopyFailure {
    pub stem: String,
    pub bucket: Bucket,
    pub message: String,
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.stem, self.bucket, self.message)
    }
}
