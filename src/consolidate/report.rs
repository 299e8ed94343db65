//! Reports for consolidation, placeholder labels and cleanup.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of gathering images from several source folders.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConsolidateReport {
    pub dest: PathBuf,
    pub sources: Vec<SourceSummary>,
    /// Source folders that did not exist.
    pub missing_sources: Vec<PathBuf>,
    /// Total images copied into `dest`.
    pub copied: usize,
    pub failures: Vec<FileFailure>,
}

impl fmt::Display for ConsolidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Image consolidation ===")?;
        for source in &self.sources {
            writeln!(
                f,
                "{}: {} image(s) from {} category folder(s)",
                source.path.display(),
                source.copied,
                source.category_dirs.len()
            )?;
        }
        for missing in &self.missing_sources {
            writeln!(f, "{}: not found, skipped", missing.display())?;
        }
        if !self.failures.is_empty() {
            writeln!(f, "Failed copies ({}):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  - {}", failure)?;
            }
        }
        writeln!(
            f,
            "Consolidated {} image(s) into {}",
            self.copied,
            self.dest.display()
        )
    }
}

/// Per-source counts.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    /// Category folder names found directly inside the source.
    pub category_dirs: Vec<String>,
    pub copied: usize,
}

/// A single file that could not be processed.
#[derive(Clone, Debug, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Outcome of synthesizing placeholder labels.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PlaceholderReport {
    /// Labels written.
    pub created: usize,
    /// Images that already had a label.
    pub existing: usize,
    /// Images left unlabeled because no keyword matched.
    pub unknown: usize,
    /// Labels written per class id.
    pub per_class: Vec<usize>,
    pub failures: Vec<FileFailure>,
}

impl fmt::Display for PlaceholderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Placeholder labels ===")?;
        writeln!(f, "Created: {}", self.created)?;
        writeln!(f, "Already labeled: {}", self.existing)?;
        if self.unknown > 0 {
            writeln!(f, "Unknown class (skipped): {}", self.unknown)?;
        }
        for failure in &self.failures {
            writeln!(f, "  failed: {}", failure)?;
        }
        writeln!(
            f,
            "Note: placeholder boxes are not real annotations; relabel before training."
        )
    }
}

/// Outcome of removing source folders.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    /// Folders that would be removed once confirmed.
    pub pending: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in &self.removed {
            writeln!(f, "Removed: {}", path.display())?;
        }
        for path in &self.pending {
            writeln!(f, "Would remove: {} (pass --yes to delete)", path.display())?;
        }
        for failure in &self.failures {
            writeln!(f, "Failed to remove {}", failure)?;
        }
        Ok(())
    }
}
