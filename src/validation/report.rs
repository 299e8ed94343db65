//! Validation report types for structured error reporting.
//!
//! Label findings are the validator's designed output rather than process
//! failures, so every check produces one of these reports.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Lists longer than this are truncated when displayed.
pub const DISPLAY_LIMIT: usize = 10;

/// A stable code identifying the kind of label problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LabelIssueKind {
    /// The line does not have exactly five fields.
    FieldCount,
    /// A field could not be parsed as a number.
    ParseError,
    /// `class_id` is outside `[0, num_classes)`.
    ClassOutOfRange,
    /// A coordinate is outside `[0, 1]`.
    CoordOutOfRange,
    /// Width or height is zero or negative.
    NonPositiveSize,
    /// The file could not be read at all.
    ReadError,
}

/// One problem found in a label file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelIssue {
    /// 1-indexed line number, or `None` for file-level problems.
    pub line: Option<usize>,
    pub kind: LabelIssueKind,
    pub message: String,
}

impl LabelIssue {
    pub fn at_line(line: usize, kind: LabelIssueKind, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            kind,
            message: message.into(),
        }
    }

    pub fn file_level(kind: LabelIssueKind, message: impl Into<String>) -> Self {
        Self {
            line: None,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for LabelIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Issues found in a single label file.
#[derive(Clone, Debug, Serialize)]
pub struct FileIssues {
    pub path: PathBuf,
    pub issues: Vec<LabelIssue>,
}

impl FileIssues {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of validating every label file in a directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DatasetReport {
    pub dir: PathBuf,
    /// Number of label files checked.
    pub label_files: usize,
    /// Sum of issues across all files.
    pub total_errors: usize,
    /// Files with at least one issue, in file name order.
    pub problem_files: Vec<FileIssues>,
    /// Files with no issues, in file name order.
    pub ok_files: Vec<PathBuf>,
}

impl DatasetReport {
    /// True when the directory had no label files at all.
    pub fn is_empty_warning(&self) -> bool {
        self.label_files == 0
    }

    /// True when no label errors were found.
    pub fn is_ok(&self) -> bool {
        self.total_errors == 0
    }

    pub fn problem_file_count(&self) -> usize {
        self.problem_files.len()
    }
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_warning() {
            return writeln!(
                f,
                "Warning: no label files (.txt) found in {}",
                self.dir.display()
            );
        }

        for file in &self.problem_files {
            writeln!(f, "Problems in {}:", file.file_name())?;
            for issue in &file.issues {
                writeln!(f, "  - {}", issue)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "=== Label validation ===")?;
        writeln!(f, "Label files:   {}", self.label_files)?;
        writeln!(f, "Problem files: {}", self.problem_files.len())?;
        writeln!(f, "Total errors:  {}", self.total_errors)?;

        if self.problem_files.is_empty() {
            writeln!(f, "All label files are valid.")?;
        } else {
            writeln!(f)?;
            writeln!(f, "Problem file list:")?;
            for file in &self.problem_files {
                writeln!(f, "  - {}", file.file_name())?;
            }
        }

        Ok(())
    }
}

/// Result of comparing image stems against label stems in a directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PairingReport {
    pub dir: PathBuf,
    pub image_count: usize,
    pub label_count: usize,
    /// Stems with an image but no label.
    pub missing_labels: BTreeSet<String>,
    /// Stems with a label but no image.
    pub missing_images: BTreeSet<String>,
    /// Number of stems with both an image and a label.
    pub complete_pairs: usize,
}

impl PairingReport {
    pub fn is_complete(&self) -> bool {
        self.missing_labels.is_empty() && self.missing_images.is_empty()
    }
}

impl fmt::Display for PairingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Image/label pairing ===")?;
        writeln!(f, "Image files: {}", self.image_count)?;
        writeln!(f, "Label files: {}", self.label_count)?;

        write_truncated(f, "Images without labels", &self.missing_labels)?;
        write_truncated(f, "Labels without images", &self.missing_images)?;

        writeln!(f)?;
        writeln!(f, "Complete image/label pairs: {}", self.complete_pairs)
    }
}

fn write_truncated(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    stems: &BTreeSet<String>,
) -> fmt::Result {
    if stems.is_empty() {
        return Ok(());
    }

    writeln!(f)?;
    writeln!(f, "{} ({}):", title, stems.len())?;
    for stem in stems.iter().take(DISPLAY_LIMIT) {
        writeln!(f, "  - {}", stem)?;
    }
    if stems.len() > DISPLAY_LIMIT {
        writeln!(f, "  ... and {} more", stems.len() - DISPLAY_LIMIT)?;
    }
    Ok(())
}
