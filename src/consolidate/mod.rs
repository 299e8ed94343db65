//! Gathering scattered images into one folder before labeling.
//!
//! Collected images usually end up spread over several folders, some of
//! them with per-category subfolders. [`consolidate_images`] copies them all
//! into a single flat directory with collision-free names,
//! [`create_placeholder_labels`] can seed that directory with rough labels
//! for pipeline testing, and [`remove_sources`] deletes the old folders once
//! the user confirms.

mod report;

pub use report::{
    CleanupReport, ConsolidateReport, FileFailure, PlaceholderReport, SourceSummary,
};

use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, RngExt};
use tracing::{debug, error, info, warn};

use crate::discover::{label_path_for, list_images, list_subdirs};
use crate::error::WastekitError;
use crate::label::{guess_class, LabelRecord, DEFAULT_NUM_CLASSES};
use crate::split::copy_preserving;

/// Folders the collectors write into.
pub const DEFAULT_SOURCE_DIRS: [&str; 3] = [
    "data/pinterest_waste_images",
    "data/scraped_images",
    "data/collected_images",
];

/// Default destination for consolidated images.
pub const DEFAULT_RAW_DIR: &str = "data/raw_images";

/// A subfolder counts as a category folder when its lowercased name
/// contains one of these.
pub const CATEGORY_KEYWORDS: [&str; 6] = ["plastic", "paper", "metal", "glass", "organic", "food"];

/// Copy every image from `sources` into `dest`.
///
/// For each source that exists, images inside category subfolders are
/// copied first as `<folder>_<NNNN>_<name>`, then images directly inside the
/// source as `misc_<NNNN>_<name>`. `NNNN` counts successful copies across the
/// whole run. Failed copies are logged and reported.
pub fn consolidate_images(
    sources: &[PathBuf],
    dest: &Path,
) -> Result<ConsolidateReport, WastekitError> {
    fs::create_dir_all(dest).map_err(|source| WastekitError::OutputNotCreatable {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut report = ConsolidateReport {
        dest: dest.to_path_buf(),
        ..Default::default()
    };

    for source in sources {
        if !source.is_dir() {
            debug!("source {} does not exist, skipping", source.display());
            report.missing_sources.push(source.clone());
            continue;
        }

        info!("collecting images from {}", source.display());
        let mut summary = SourceSummary {
            path: source.clone(),
            ..Default::default()
        };

        let category_dirs: Vec<PathBuf> = list_subdirs(source)?
            .into_iter()
            .filter(|dir| is_category_dir(dir))
            .collect();

        for category_dir in &category_dirs {
            let category = dir_name(category_dir);
            info!("  category: {}", category);
            for image in list_images(category_dir)? {
                copy_numbered(&image, dest, &category, &mut report, &mut summary);
            }
            summary.category_dirs.push(category);
        }

        for image in list_images(source)? {
            copy_numbered(&image, dest, "misc", &mut report, &mut summary);
        }

        report.sources.push(summary);
    }

    info!("consolidated {} image(s)", report.copied);
    Ok(report)
}

fn copy_numbered(
    image: &Path,
    dest: &Path,
    prefix: &str,
    report: &mut ConsolidateReport,
    summary: &mut SourceSummary,
) {
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = dest.join(format!("{}_{:04}_{}", prefix, report.copied, file_name));

    match copy_preserving(image, &target) {
        Ok(()) => {
            report.copied += 1;
            summary.copied += 1;
            if report.copied % 10 == 0 {
                info!("    consolidated {} image(s)", report.copied);
            }
        }
        Err(source) => {
            error!("failed to copy {}: {}", image.display(), source);
            report.failures.push(FileFailure {
                path: image.to_path_buf(),
                message: source.to_string(),
            });
        }
    }
}

fn is_category_dir(dir: &Path) -> bool {
    let name = dir_name(dir).to_lowercase();
    CATEGORY_KEYWORDS.iter().any(|kw| name.contains(kw))
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// What to do with an image whose name matches no class keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackClass {
    /// Pick a class uniformly at random.
    Random,
    /// Leave the image unlabeled.
    Skip,
}

/// Write a placeholder label next to every image in `dir` that lacks one.
///
/// The class comes from [`guess_class`] on the file name, or from
/// `fallback`. The box is centered in `[0.3, 0.7)` with sides in
/// `[0.2, 0.4)`. Existing labels are never touched.
pub fn create_placeholder_labels<R: Rng + ?Sized>(
    dir: &Path,
    fallback: FallbackClass,
    rng: &mut R,
) -> Result<PlaceholderReport, WastekitError> {
    let images = list_images(dir)?;
    let mut report = PlaceholderReport {
        per_class: vec![0; DEFAULT_NUM_CLASSES],
        ..Default::default()
    };

    if images.is_empty() {
        warn!("no images found in {}", dir.display());
        return Ok(report);
    }

    for image in images {
        let label_path = label_path_for(&image);
        if label_path.exists() {
            report.existing += 1;
            continue;
        }

        let name = image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let class_id = match (guess_class(&name), fallback) {
            (Some(class_id), _) => class_id,
            (None, FallbackClass::Random) => rng.random_range(0..DEFAULT_NUM_CLASSES),
            (None, FallbackClass::Skip) => {
                debug!("no class keyword in {}, leaving unlabeled", name);
                report.unknown += 1;
                continue;
            }
        };

        let record = LabelRecord::new(
            class_id as i64,
            rng.random_range(0.3..0.7),
            rng.random_range(0.3..0.7),
            rng.random_range(0.2..0.4),
            rng.random_range(0.2..0.4),
        );

        match fs::write(&label_path, format!("{record}\n")) {
            Ok(()) => {
                report.created += 1;
                report.per_class[class_id] += 1;
            }
            Err(source) => {
                error!("failed to write {}: {}", label_path.display(), source);
                report.failures.push(FileFailure {
                    path: label_path,
                    message: source.to_string(),
                });
            }
        }
    }

    info!("created {} placeholder label(s)", report.created);
    Ok(report)
}

/// Delete the given source folders.
///
/// Nothing is deleted unless `confirmed` is true; otherwise the folders that
/// would be deleted are listed as pending.
pub fn remove_sources(sources: &[PathBuf], confirmed: bool) -> CleanupReport {
    let mut report = CleanupReport::default();

    for source in sources.iter().filter(|s| s.exists()) {
        if !confirmed {
            report.pending.push(source.clone());
            continue;
        }

        match fs::remove_dir_all(source) {
            Ok(()) => {
                info!("removed {}", source.display());
                report.removed.push(source.clone());
            }
            Err(err) => {
                error!("failed to remove {}: {}", source.display(), err);
                report.failures.push(FileFailure {
                    path: source.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    report
}
