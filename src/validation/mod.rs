//! Label validation for wastekit.
//!
//! This module checks label files for:
//! - Syntax (five whitespace-separated numeric fields per line)
//! - Class ids within `[0, num_classes)`
//! - Normalized coordinates within `[0, 1]` and positive box sizes
//!
//! It also compares image stems against label stems to find unpaired files.

mod report;

pub use report::{
    DatasetReport, FileIssues, LabelIssue, LabelIssueKind, PairingReport, DISPLAY_LIMIT,
};

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::discover::{list_images, list_labels, stem_of};
use crate::error::WastekitError;
use crate::label::{parse_label_line, LabelRecord, LineError};

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// Number of valid class ids.
    pub num_classes: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            num_classes: crate::label::DEFAULT_NUM_CLASSES,
        }
    }
}

impl ValidateOptions {
    pub fn new(num_classes: usize) -> Result<Self, WastekitError> {
        if num_classes == 0 {
            return Err(WastekitError::InvalidClassCount { value: num_classes });
        }
        Ok(Self { num_classes })
    }
}

/// Validates one label file and returns every issue found.
///
/// Never fails: an unreadable file yields a single
/// [`LabelIssueKind::ReadError`] issue.
pub fn validate_label_file(path: &Path, num_classes: usize) -> Vec<LabelIssue> {
    match fs::read_to_string(path) {
        Ok(content) => validate_label_str(&content, num_classes),
        Err(source) => {
            warn!("failed to read label file {}: {}", path.display(), source);
            vec![LabelIssue::file_level(
                LabelIssueKind::ReadError,
                format!("failed to read file: {source}"),
            )]
        }
    }
}

/// Validates label file content line by line.
///
/// Lines are 1-indexed; blank lines are skipped. A line with the wrong
/// field count or an unparsable field yields exactly one issue and is not
/// range-checked. A parsed line may yield several range issues.
pub fn validate_label_str(content: &str, num_classes: usize) -> Vec<LabelIssue> {
    let mut issues = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;

        match parse_label_line(line) {
            Ok(None) => {}
            Ok(Some(record)) => check_record(&record, line_num, num_classes, &mut issues),
            Err(err @ LineError::FieldCount { .. }) => {
                issues.push(LabelIssue::at_line(
                    line_num,
                    LabelIssueKind::FieldCount,
                    err.to_string(),
                ));
            }
            Err(err @ LineError::InvalidNumber { .. }) => {
                issues.push(LabelIssue::at_line(
                    line_num,
                    LabelIssueKind::ParseError,
                    format!("number conversion error: {err}"),
                ));
            }
        }
    }

    issues
}

/// Range checks for one parsed record.
fn check_record(
    record: &LabelRecord,
    line_num: usize,
    num_classes: usize,
    issues: &mut Vec<LabelIssue>,
) {
    let class_ok = usize::try_from(record.class_id)
        .map(|id| id < num_classes)
        .unwrap_or(false);
    if !class_ok {
        issues.push(LabelIssue::at_line(
            line_num,
            LabelIssueKind::ClassOutOfRange,
            format!(
                "invalid class id {} (expected 0-{})",
                record.class_id,
                num_classes.saturating_sub(1)
            ),
        ));
    }

    for (name, value) in record.coords() {
        // NaN fails this check too.
        if !(0.0..=1.0).contains(&value) {
            issues.push(LabelIssue::at_line(
                line_num,
                LabelIssueKind::CoordOutOfRange,
                format!("{name} value {value} is outside 0-1"),
            ));
        }
    }

    if record.width <= 0.0 || record.height <= 0.0 {
        issues.push(LabelIssue::at_line(
            line_num,
            LabelIssueKind::NonPositiveSize,
            format!(
                "box size must be positive (width: {}, height: {})",
                record.width, record.height
            ),
        ));
    }
}

/// Validates every `.txt` file directly inside `dir`.
///
/// Only a missing directory is an error. A directory without label files
/// produces an empty report flagged by [`DatasetReport::is_empty_warning`].
pub fn validate_dataset(dir: &Path, num_classes: usize) -> Result<DatasetReport, WastekitError> {
    let label_files = list_labels(dir)?;

    let mut report = DatasetReport {
        dir: dir.to_path_buf(),
        label_files: label_files.len(),
        ..Default::default()
    };

    if label_files.is_empty() {
        warn!("no label files (.txt) found in {}", dir.display());
        return Ok(report);
    }

    info!("validating {} label file(s)", label_files.len());

    for path in label_files {
        let issues = validate_label_file(&path, num_classes);
        if issues.is_empty() {
            info!("OK: {}", path.display());
            report.ok_files.push(path);
        } else {
            debug!("{} issue(s) in {}", issues.len(), path.display());
            report.total_errors += issues.len();
            report.problem_files.push(FileIssues { path, issues });
        }
    }

    Ok(report)
}

/// Compares image stems against label stems directly inside `dir`.
pub fn check_pairing(dir: &Path) -> Result<PairingReport, WastekitError> {
    let images = list_images(dir)?;
    let labels = list_labels(dir)?;

    let image_stems: BTreeSet<String> = images.iter().map(|p| stem_of(p)).collect();
    let label_stems: BTreeSet<String> = labels.iter().map(|p| stem_of(p)).collect();

    let report = PairingReport {
        dir: dir.to_path_buf(),
        image_count: images.len(),
        label_count: labels.len(),
        missing_labels: image_stems.difference(&label_stems).cloned().collect(),
        missing_images: label_stems.difference(&image_stems).cloned().collect(),
        complete_pairs: image_stems.intersection(&label_stems).count(),
    };

    info!(
        "pairing: {} image(s), {} label(s), {} complete pair(s)",
        report.image_count, report.label_count, report.complete_pairs
    );

    Ok(report)
}
