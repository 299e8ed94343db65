//! Flat directory scanning for images and label files.
//!
//! Every scan is non-recursive: only files directly inside the given
//! directory are considered. Results are sorted by file name so that callers
//! see the same order regardless of how the filesystem enumerates entries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::WastekitError;
use crate::label::LABEL_EXTENSION;

/// Recognized image extensions, matched case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// An image and the label file sharing its stem.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageLabelPair {
    pub stem: String,
    pub image: PathBuf,
    pub label: PathBuf,
}

impl ImageLabelPair {
    /// File name of the image, used as the destination name when copying.
    pub fn image_file_name(&self) -> &std::ffi::OsStr {
        self.image.file_name().unwrap_or(self.image.as_os_str())
    }

    /// File name of the label, used as the destination name when copying.
    pub fn label_file_name(&self) -> &std::ffi::OsStr {
        self.label.file_name().unwrap_or(self.label.as_os_str())
    }
}

/// Result of pairing images with labels in one directory.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    /// Pairs sorted by stem.
    pub pairs: Vec<ImageLabelPair>,
    /// Images with no sibling label file.
    pub unmatched_images: Vec<PathBuf>,
    /// Images skipped because an earlier image already claimed their stem.
    pub duplicate_images: Vec<PathBuf>,
    /// Total number of image files seen.
    pub image_count: usize,
}

/// List image files directly inside `dir`.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, WastekitError> {
    list_files_with_extensions(dir, &IMAGE_EXTENSIONS)
}

/// List label files directly inside `dir`.
///
/// Unlike images, the `.txt` extension is matched case-sensitively, which is
/// also the only spelling [`label_path_for`] produces.
pub fn list_labels(dir: &Path) -> Result<Vec<PathBuf>, WastekitError> {
    let mut labels = list_files_with_extensions(dir, &[LABEL_EXTENSION])?;
    labels.retain(|path| path.extension().is_some_and(|ext| ext == LABEL_EXTENSION));
    Ok(labels)
}

/// Pair every image in `dir` with its sibling `<stem>.txt`.
///
/// When two images share a stem (`a.jpg` and `a.png`), the first by file
/// name forms the pair and the rest are reported as duplicates, so that the
/// partition keeps images and labels in 1:1 correspondence.
pub fn discover_pairs(dir: &Path) -> Result<Discovery, WastekitError> {
    let images = list_images(dir)?;
    let mut discovery = Discovery {
        image_count: images.len(),
        ..Default::default()
    };

    let mut by_stem: BTreeMap<String, ImageLabelPair> = BTreeMap::new();
    for image in images {
        let stem = stem_of(&image);
        let label = label_path_for(&image);

        if !label.is_file() {
            discovery.unmatched_images.push(image);
            continue;
        }

        if by_stem.contains_key(&stem) {
            discovery.duplicate_images.push(image);
            continue;
        }

        by_stem.insert(
            stem.clone(),
            ImageLabelPair {
                stem,
                image,
                label,
            },
        );
    }

    discovery.pairs = by_stem.into_values().collect();
    Ok(discovery)
}

/// The label path expected for an image: same directory, same stem, `.txt`.
pub fn label_path_for(image: &Path) -> PathBuf {
    image.with_extension(LABEL_EXTENSION)
}

/// File name without its final extension, lossily converted to UTF-8.
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

pub fn is_image(path: &Path) -> bool {
    has_extension(path, &IMAGE_EXTENSIONS)
}

/// List directories directly inside `dir`, sorted by name.
pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>, WastekitError> {
    if !dir.is_dir() {
        return Err(WastekitError::DirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let Some(entry) = readable_entry(entry) else {
            continue;
        };
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    dirs.sort();
    Ok(dirs)
}

fn list_files_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, WastekitError> {
    if !dir.is_dir() {
        return Err(WastekitError::DirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let Some(entry) = readable_entry(entry) else {
            continue;
        };

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Entries that cannot be read (dangling symlinks, permission errors) are
/// logged and skipped.
fn readable_entry(entry: walkdir::Result<walkdir::DirEntry>) -> Option<walkdir::DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            let path = err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            warn!("skipping unreadable entry {}: {}", path, err);
            None
        }
    }
}
