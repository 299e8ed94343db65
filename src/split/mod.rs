//! Train/validation splitting.
//!
//! Pairs are discovered in a flat source directory, shuffled, cut at
//! `floor(n * train_ratio)` and copied into:
//!
//! ```text
//! <output>/train/images  <output>/train/labels
//! <output>/valid/images  <output>/valid/labels
//! ```
//!
//! Each bucket is rebuilt from scratch on every run.

mod report;

pub use report::{CopyFailure, SplitReport};

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::discover::{discover_pairs, ImageLabelPair};
use crate::error::WastekitError;

pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Ratios outside this band fall back to [`DEFAULT_TRAIN_RATIO`].
pub const MIN_TRAIN_RATIO: f64 = 0.1;
pub const MAX_TRAIN_RATIO: f64 = 0.9;

/// Options for splitting.
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub train_ratio: f64,
    /// Shuffle seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Build each bucket in a staging directory and rename it into place.
    pub atomic: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: DEFAULT_TRAIN_RATIO,
            seed: None,
            atomic: true,
        }
    }
}

impl SplitOptions {
    /// Options with a ratio that must lie strictly inside `(0, 1)`.
    pub fn new_strict(train_ratio: f64, seed: Option<u64>) -> Result<Self, WastekitError> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(WastekitError::InvalidRatio { value: train_ratio });
        }
        Ok(Self {
            train_ratio,
            seed,
            ..Default::default()
        })
    }

    /// Options with a lenient ratio; see [`resolve_ratio`].
    pub fn lenient(train_ratio: Option<f64>, seed: Option<u64>) -> Self {
        Self {
            train_ratio: resolve_ratio(train_ratio),
            seed,
            ..Default::default()
        }
    }
}

/// Apply the fallback rule for user-supplied ratios.
///
/// `None` or a value outside `[0.1, 0.9]` yields the default 0.8.
pub fn resolve_ratio(raw: Option<f64>) -> f64 {
    match raw {
        None => DEFAULT_TRAIN_RATIO,
        Some(ratio) if (MIN_TRAIN_RATIO..=MAX_TRAIN_RATIO).contains(&ratio) => ratio,
        Some(ratio) => {
            warn!(
                "train ratio {} is outside {}-{}; using default {}",
                ratio, MIN_TRAIN_RATIO, MAX_TRAIN_RATIO, DEFAULT_TRAIN_RATIO
            );
            DEFAULT_TRAIN_RATIO
        }
    }
}

/// One of the two output partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Train,
    Valid,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Train, Bucket::Valid];

    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Train => "train",
            Bucket::Valid => "valid",
        }
    }

    /// `<output>/<bucket>`.
    pub fn dir(self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.dir_name())
    }

    /// `<output>/<bucket>/images`.
    pub fn images_dir(self, output_dir: &Path) -> PathBuf {
        self.dir(output_dir).join("images")
    }

    /// `<output>/<bucket>/labels`.
    pub fn labels_dir(self, output_dir: &Path) -> PathBuf {
        self.dir(output_dir).join("labels")
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Shuffled pairs cut into train and validation sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    pub train: Vec<ImageLabelPair>,
    pub valid: Vec<ImageLabelPair>,
}

impl Partition {
    pub fn pairs(&self, bucket: Bucket) -> &[ImageLabelPair] {
        match bucket {
            Bucket::Train => &self.train,
            Bucket::Valid => &self.valid,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of pairs that go to `train`: `floor(n * ratio)`, capped at `n`.
pub fn split_point(n: usize, ratio: f64) -> usize {
    let raw = (n as f64 * ratio).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(n)
    }
}

/// Shuffle `pairs` with `rng` and cut them at [`split_point`].
///
/// Pairs are sorted first so that a given seed always yields the same
/// partition, whatever order they were discovered in.
pub fn partition<R: Rng + ?Sized>(
    mut pairs: Vec<ImageLabelPair>,
    ratio: f64,
    rng: &mut R,
) -> Partition {
    pairs.sort();
    pairs.shuffle(rng);

    let cut = split_point(pairs.len(), ratio);
    let valid = pairs.split_off(cut);
    Partition {
        train: pairs,
        valid,
    }
}

/// Partition with an optional seed.
pub fn partition_seeded(pairs: Vec<ImageLabelPair>, ratio: f64, seed: Option<u64>) -> Partition {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        partition(pairs, ratio, &mut rng)
    } else {
        let mut rng = rand::rng();
        partition(pairs, ratio, &mut rng)
    }
}

/// Split the pairs in `source_dir` into `output_dir`.
///
/// Fails without touching `output_dir` when the source holds no images or
/// no complete pairs. Individual copy failures are logged and reported but
/// do not abort the run.
pub fn split(
    source_dir: &Path,
    output_dir: &Path,
    opts: &SplitOptions,
) -> Result<SplitReport, WastekitError> {
    let discovery = discover_pairs(source_dir)?;

    if discovery.image_count == 0 {
        return Err(WastekitError::NoImagesFound {
            path: source_dir.to_path_buf(),
        });
    }
    if discovery.pairs.is_empty() {
        return Err(WastekitError::NoPairsFound {
            path: source_dir.to_path_buf(),
        });
    }

    info!(
        "found {} image/label pair(s) in {}",
        discovery.pairs.len(),
        source_dir.display()
    );
    if !discovery.unmatched_images.is_empty() {
        info!(
            "{} image(s) have no label file and are excluded",
            discovery.unmatched_images.len()
        );
    }
    for dup in &discovery.duplicate_images {
        warn!("skipping {}: stem already used by another image", dup.display());
    }

    let pairs_found = discovery.pairs.len();
    let partition = partition_seeded(discovery.pairs, opts.train_ratio, opts.seed);
    info!(
        "train: {}, valid: {}",
        partition.train.len(),
        partition.valid.len()
    );

    let mut report = SplitReport {
        source_dir: source_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        train_ratio: opts.train_ratio,
        seed: opts.seed,
        pairs_found,
        unmatched_images: discovery.unmatched_images.len(),
        duplicate_images: discovery.duplicate_images.len(),
        ..Default::default()
    };

    materialize(output_dir, &partition, opts.atomic, &mut report)?;

    Ok(report)
}

/// Write both buckets of `partition` under `output_dir`.
///
/// Fills `train_count`, `valid_count` and `failures` in `report`.
pub fn materialize(
    output_dir: &Path,
    partition: &Partition,
    atomic: bool,
    report: &mut SplitReport,
) -> Result<(), WastekitError> {
    create_dir(output_dir)?;

    for bucket in Bucket::ALL {
        let pairs = partition.pairs(bucket);
        info!("copying {} data ({} pair(s))", bucket, pairs.len());

        let copied = if atomic {
            write_bucket_staged(output_dir, bucket, pairs, &mut report.failures)?
        } else {
            write_bucket_in_place(output_dir, bucket, pairs, &mut report.failures)?
        };

        match bucket {
            Bucket::Train => report.train_count = copied,
            Bucket::Valid => report.valid_count = copied,
        }
    }

    Ok(())
}

/// Build the bucket in `.<bucket>.staging`, then swap it in.
fn write_bucket_staged(
    output_dir: &Path,
    bucket: Bucket,
    pairs: &[ImageLabelPair],
    failures: &mut Vec<CopyFailure>,
) -> Result<usize, WastekitError> {
    let staging = output_dir.join(format!(".{}.staging", bucket.dir_name()));
    reset_dir(&staging)?;

    let copied = copy_pairs(
        pairs,
        &staging.join("images"),
        &staging.join("labels"),
        bucket,
        failures,
    )?;

    let final_dir = bucket.dir(output_dir);
    if final_dir.exists() {
        fs::remove_dir_all(&final_dir).map_err(|source| WastekitError::OutputNotCreatable {
            path: final_dir.clone(),
            source,
        })?;
    }
    fs::rename(&staging, &final_dir).map_err(|source| WastekitError::OutputNotCreatable {
        path: final_dir.clone(),
        source,
    })?;

    Ok(copied)
}

/// Clear the bucket's directories, then copy into them directly.
fn write_bucket_in_place(
    output_dir: &Path,
    bucket: Bucket,
    pairs: &[ImageLabelPair],
    failures: &mut Vec<CopyFailure>,
) -> Result<usize, WastekitError> {
    let images_dir = bucket.images_dir(output_dir);
    let labels_dir = bucket.labels_dir(output_dir);
    reset_dir(&images_dir)?;
    reset_dir(&labels_dir)?;

    copy_pairs(pairs, &images_dir, &labels_dir, bucket, failures)
}

fn copy_pairs(
    pairs: &[ImageLabelPair],
    images_dir: &Path,
    labels_dir: &Path,
    bucket: Bucket,
    failures: &mut Vec<CopyFailure>,
) -> Result<usize, WastekitError> {
    create_dir(images_dir)?;
    create_dir(labels_dir)?;

    let mut copied = 0;
    for pair in pairs {
        let image_dst = images_dir.join(pair.image_file_name());
        let label_dst = labels_dir.join(pair.label_file_name());

        let result = copy_preserving(&pair.image, &image_dst)
            .and_then(|()| copy_preserving(&pair.label, &label_dst));

        match result {
            Ok(()) => {
                debug!("copied {} into {}", pair.stem, bucket);
                copied += 1;
            }
            Err(source) => {
                error!("failed to copy {} into {}: {}", pair.stem, bucket, source);
                // Keep images/ and labels/ in 1:1 correspondence.
                let _ = fs::remove_file(&image_dst);
                let _ = fs::remove_file(&label_dst);
                failures.push(CopyFailure {
                    stem: pair.stem.clone(),
                    bucket,
                    message: source.to_string(),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy a file, keeping its content, permissions and modification time.
pub fn copy_preserving(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;

    let modified = fs::metadata(src)?.modified()?;
    match fs::File::open(dst) {
        Ok(file) => file.set_modified(modified)?,
        Err(source) => warn!(
            "copied {} but could not restore its modification time: {}",
            dst.display(),
            source
        ),
    }

    Ok(())
}

fn reset_dir(path: &Path) -> Result<(), WastekitError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|source| WastekitError::OutputNotCreatable {
            path: path.to_path_buf(),
            source,
        })?;
    }
    create_dir(path)
}

fn create_dir(path: &Path) -> Result<(), WastekitError> {
    fs::create_dir_all(path).map_err(|source| WastekitError::OutputNotCreatable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn fake_pairs(n: usize) -> Vec<ImageLabelPair> {
        (0..n)
            .map(|i| ImageLabelPair {
                stem: format!("img_{i:04}"),
                image: PathBuf::from(format!("src/img_{i:04}.jpg")),
                label: PathBuf::from(format!("src/img_{i:04}.txt")),
            })
            .collect()
    }

    #[test]
    fn split_point_follows_floor_law() {
        let cases = [
            (0, [0, 0, 0, 0]),
            (1, [0, 0, 0, 0]),
            (2, [0, 1, 1, 1]),
            (10, [1, 5, 8, 9]),
            (101, [10, 50, 80, 90]),
        ];
        let ratios = [0.1, 0.5, 0.8, 0.9];

        for (n, expected) in cases {
            for (ratio, want) in ratios.iter().zip(expected) {
                assert_eq!(split_point(n, *ratio), want, "n={n} ratio={ratio}");
            }
        }
    }

    #[test]
    fn split_point_never_exceeds_n() {
        assert_eq!(split_point(3, 1.5), 3);
        assert_eq!(split_point(3, -0.5), 0);
    }

    #[test]
    fn single_pair_goes_to_valid_when_cut_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let part = partition(fake_pairs(1), 0.8, &mut rng);
        assert!(part.train.is_empty());
        assert_eq!(part.valid.len(), 1);
    }

    #[test]
    fn partition_is_deterministic_with_seed() {
        let a = partition_seeded(fake_pairs(20), 0.8, Some(42));
        let b = partition_seeded(fake_pairs(20), 0.8, Some(42));
        assert_eq!(a, b);
    }

    #[test]
    fn partition_ignores_input_order() {
        let mut reversed = fake_pairs(20);
        reversed.reverse();
        let a = partition_seeded(fake_pairs(20), 0.5, Some(7));
        let b = partition_seeded(reversed, 0.5, Some(7));
        assert_eq!(a, b);
    }

    #[test]
    fn partition_covers_every_pair_once() {
        let pairs = fake_pairs(37);
        let part = partition_seeded(pairs.clone(), 0.7, None);

        let mut seen: Vec<&str> = part
            .train
            .iter()
            .chain(part.valid.iter())
            .map(|p| p.stem.as_str())
            .collect();
        seen.sort();
        let unique: BTreeSet<&str> = seen.iter().copied().collect();

        assert_eq!(seen.len(), pairs.len());
        assert_eq!(unique.len(), pairs.len());
    }

    #[test]
    fn resolve_ratio_falls_back_outside_band() {
        assert_eq!(resolve_ratio(None), DEFAULT_TRAIN_RATIO);
        assert_eq!(resolve_ratio(Some(0.7)), 0.7);
        assert_eq!(resolve_ratio(Some(0.1)), 0.1);
        assert_eq!(resolve_ratio(Some(0.9)), 0.9);
        assert_eq!(resolve_ratio(Some(0.95)), DEFAULT_TRAIN_RATIO);
        assert_eq!(resolve_ratio(Some(0.0)), DEFAULT_TRAIN_RATIO);
        assert_eq!(resolve_ratio(Some(f64::NAN)), DEFAULT_TRAIN_RATIO);
    }

    #[test]
    fn strict_options_reject_bounds() {
        assert!(SplitOptions::new_strict(0.0, None).is_err());
        assert!(SplitOptions::new_strict(1.0, None).is_err());
        assert!(SplitOptions::new_strict(0.95, Some(1)).is_ok());
    }

    #[test]
    fn copy_failure_is_recorded_not_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("src");
        fs::create_dir_all(&src).expect("create src");
        fs::write(src.join("ok.jpg"), b"img").expect("write image");
        fs::write(src.join("ok.txt"), b"0 0.5 0.5 0.3 0.3\n").expect("write label");

        let good = ImageLabelPair {
            stem: "ok".to_string(),
            image: src.join("ok.jpg"),
            label: src.join("ok.txt"),
        };
        let gone = ImageLabelPair {
            stem: "gone".to_string(),
            image: src.join("gone.jpg"),
            label: src.join("gone.txt"),
        };
        let part = Partition {
            train: vec![good, gone],
            valid: vec![],
        };

        let out = temp.path().join("out");
        let mut report = SplitReport::default();
        materialize(&out, &part, true, &mut report).expect("materialize");

        assert_eq!(report.counts(), (1, 0));
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures[0].stem, "gone");
        assert!(out.join("train/images/ok.jpg").is_file());
        assert!(!out.join("train/images/gone.jpg").exists());
        assert!(out.join("valid/images").is_dir());
        assert!(!out.join(".train.staging").exists());
    }

    #[test]
    fn in_place_mode_clears_stale_files() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("out");
        fs::create_dir_all(out.join("train/images")).expect("create stale dir");
        fs::write(out.join("train/images/stale.jpg"), b"old").expect("write stale");

        let mut report = SplitReport::default();
        materialize(&out, &Partition::default(), false, &mut report).expect("materialize");

        assert!(out.join("train/images").is_dir());
        assert!(!out.join("train/images/stale.jpg").exists());
    }

    #[test]
    fn copy_preserves_modification_time() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("a.jpg");
        let dst = temp.path().join("b.jpg");
        fs::write(&src, b"pixels").expect("write src");

        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .expect("open src")
            .set_modified(old)
            .expect("set mtime");

        copy_preserving(&src, &dst).expect("copy");
        let copied = fs::metadata(&dst).expect("stat dst").modified().expect("mtime");
        assert_eq!(copied, old);
        assert_eq!(fs::read(&dst).expect("read dst"), b"pixels");
    }

    #[test]
    fn copy_of_read_only_file_keeps_modification_time() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("a.jpg");
        let dst = temp.path().join("b.jpg");
        fs::write(&src, b"pixels").expect("write src");

        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .expect("open src")
            .set_modified(old)
            .expect("set mtime");
        let mut perms = fs::metadata(&src).expect("stat src").permissions();
        perms.set_readonly(true);
        fs::set_permissions(&src, perms).expect("make src read-only");

        copy_preserving(&src, &dst).expect("copy");
        let copied = fs::metadata(&dst).expect("stat dst");
        assert!(copied.permissions().readonly());
        assert_eq!(copied.modified().expect("mtime"), old);
    }
}
