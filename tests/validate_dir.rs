//! Directory-level validation and pairing checks.

mod common;

use std::collections::BTreeSet;
use std::fs;

use common::{write_image, write_label, VALID_LINE};
use wastekit::split::{split, SplitOptions};
use wastekit::validation::{check_pairing, validate_dataset, LabelIssueKind};
use wastekit::WastekitError;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn pairing_reports_both_directions() {
    let temp = tempfile::tempdir().expect("create temp dir");
    for stem in ["a", "b", "c"] {
        write_image(temp.path(), &format!("{stem}.jpg"));
    }
    for stem in ["b", "c", "d"] {
        write_label(temp.path(), stem, VALID_LINE);
    }

    let report = check_pairing(temp.path()).expect("check pairing");
    assert_eq!(report.image_count, 3);
    assert_eq!(report.label_count, 3);
    assert_eq!(report.missing_labels, set(&["a"]));
    assert_eq!(report.missing_images, set(&["d"]));
    assert_eq!(report.complete_pairs, 2);
    assert!(!report.is_complete());

    let text = report.to_string();
    assert!(text.contains("Images without labels (1)"));
    assert!(text.contains("Labels without images (1)"));
    assert!(text.contains("Complete image/label pairs: 2"));
}

#[test]
fn long_pairing_lists_are_truncated() {
    let temp = tempfile::tempdir().expect("create temp dir");
    for i in 0..13 {
        write_image(temp.path(), &format!("img_{i:02}.png"));
    }

    let report = check_pairing(temp.path()).expect("check pairing");
    let text = report.to_string();
    assert!(text.contains("img_09"));
    assert!(!text.contains("img_10"));
    assert!(text.contains("... and 3 more"));
}

#[test]
fn dataset_report_collects_problem_files() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_label(temp.path(), "good", &format!("{VALID_LINE}\n1 0.2 0.2 0.1 0.1\n"));
    write_label(temp.path(), "bad_class", "9 0.5 0.5 0.2 0.2\n");
    write_label(temp.path(), "mixed", "0 0.5 0.5\n\n0 1.5 0.5 0 0.2\n");

    let report = validate_dataset(temp.path(), 5).expect("validate");
    assert_eq!(report.label_files, 3);
    assert_eq!(report.ok_files, vec![temp.path().join("good.txt")]);
    assert_eq!(report.problem_file_count(), 2);
    assert_eq!(report.total_errors, 4);
    assert!(!report.is_ok());

    let mixed = report
        .problem_files
        .iter()
        .find(|f| f.file_name() == "mixed.txt")
        .expect("mixed file reported");
    let lines: Vec<_> = mixed.issues.iter().map(|i| (i.line, i.kind)).collect();
    assert_eq!(
        lines,
        vec![
            (Some(1), LabelIssueKind::FieldCount),
            (Some(3), LabelIssueKind::CoordOutOfRange),
            (Some(3), LabelIssueKind::NonPositiveSize),
        ]
    );
}

#[test]
fn class_count_controls_valid_ids() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_label(temp.path(), "seven", "7 0.5 0.5 0.2 0.2\n");

    assert!(!validate_dataset(temp.path(), 5).expect("validate").is_ok());
    assert!(validate_dataset(temp.path(), 8).expect("validate").is_ok());
}

#[test]
fn empty_directory_is_a_warning_not_an_error() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_image(temp.path(), "a.jpg");

    let report = validate_dataset(temp.path(), 5).expect("validate");
    assert!(report.is_empty_warning());
    assert!(report.is_ok());
    assert!(report.to_string().contains("no label files"));
}

#[test]
fn missing_directory_is_an_error() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let err = validate_dataset(&temp.path().join("nope"), 5).expect_err("missing dir");
    assert!(matches!(err, WastekitError::DirNotFound { .. }));

    let err = check_pairing(&temp.path().join("nope")).expect_err("missing dir");
    assert!(matches!(err, WastekitError::DirNotFound { .. }));
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_skipped_by_every_check() {
    let temp = tempfile::tempdir().expect("create temp dir");
    for stem in ["a", "b"] {
        write_image(temp.path(), &format!("{stem}.jpg"));
        write_label(temp.path(), stem, VALID_LINE);
    }
    std::os::unix::fs::symlink(temp.path().join("gone.jpg"), temp.path().join("broken.jpg"))
        .expect("create image symlink");
    std::os::unix::fs::symlink(temp.path().join("gone.txt"), temp.path().join("broken.txt"))
        .expect("create label symlink");

    let report = validate_dataset(temp.path(), 5).expect("validate");
    assert_eq!(report.label_files, 2);
    assert!(report.is_ok());

    let pairing = check_pairing(temp.path()).expect("check pairing");
    assert_eq!(pairing.complete_pairs, 2);
    assert!(pairing.is_complete());
}

#[test]
fn pairing_and_split_agree_on_label_extension_case() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let source = temp.path().join("raw");
    write_image(&source, "a.jpg");
    fs::write(source.join("a.TXT"), VALID_LINE).expect("write label");

    let pairing = check_pairing(&source).expect("check pairing");
    assert_eq!(pairing.complete_pairs, 0);
    assert_eq!(pairing.missing_labels, set(&["a"]));
    assert_eq!(pairing.label_count, 0);

    let opts = SplitOptions::lenient(None, Some(1));
    let err = split(&source, &temp.path().join("out"), &opts).expect_err("no pairs");
    assert!(matches!(err, WastekitError::NoPairsFound { .. }));
}
