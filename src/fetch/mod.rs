//! Downloading candidate images from a list of URLs.
//!
//! The URL list is usually harvested from an image-sharing site's search
//! results. Thumbnail URLs (`/236x/`) are rewritten to the larger `/736x/`
//! rendition, files are named after a running index and a CRC32C of the URL,
//! and downloads below a minimum size are discarded as icons or
//! placeholders.
//!
//! Network access needs the `fetch` feature; naming and storage helpers are
//! always available.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::consolidate::FileFailure;
use crate::error::WastekitError;

/// Downloads smaller than this are deleted.
pub const DEFAULT_MIN_BYTES: u64 = 15_000;

pub const DEFAULT_MAX_IMAGES: usize = 100;

#[cfg_attr(not(feature = "fetch"), allow(dead_code))]
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Options for [`fetch_images`].
#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub max_images: usize,
    pub min_bytes: u64,
    /// Pause between downloads.
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_IMAGES,
            min_bytes: DEFAULT_MIN_BYTES,
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Outcome of a download run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FetchReport {
    pub downloaded: Vec<PathBuf>,
    pub too_small: usize,
    pub duplicates: usize,
    pub failures: Vec<FileFailure>,
}

impl std::fmt::Display for FetchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Image download ===")?;
        writeln!(f, "Downloaded: {}", self.downloaded.len())?;
        writeln!(f, "Too small (discarded): {}", self.too_small)?;
        writeln!(f, "Duplicate URLs: {}", self.duplicates)?;
        writeln!(f, "Failed: {}", self.failures.len())
    }
}

/// What happened to a downloaded body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOutcome {
    Saved(PathBuf),
    TooSmall { size: u64 },
}

/// Prefer the 736px rendition over the 236px thumbnail.
pub fn upscale_pin_url(url: &str) -> String {
    url.replace("/236x/", "/736x/")
}

/// `waste_<NNNN>_<crc32c>.jpg`, with a 1-based index.
pub fn file_name_for_url(url: &str, index: usize) -> String {
    format!("waste_{:04}_{:08x}.jpg", index, crc32c::crc32c(url.as_bytes()))
}

/// Read one URL per line, skipping blanks and `#` comments.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, WastekitError> {
    let data = fs::read_to_string(path)?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Write `bytes` to `dest/name` unless they are smaller than `min_bytes`.
pub fn store_image(
    dest: &Path,
    name: &str,
    bytes: &[u8],
    min_bytes: u64,
) -> Result<StoreOutcome, WastekitError> {
    let size = bytes.len() as u64;
    if size < min_bytes {
        debug!("{} is too small ({} bytes)", name, size);
        return Ok(StoreOutcome::TooSmall { size });
    }

    let path = dest.join(name);
    fs::write(&path, bytes)?;
    Ok(StoreOutcome::Saved(path))
}

/// Download images from `urls` into `dest`.
///
/// Failed downloads are logged and skipped. Stops after
/// `opts.max_images` successful downloads.
#[cfg(feature = "fetch")]
pub fn fetch_images(
    urls: &[String],
    dest: &Path,
    opts: &FetchOptions,
) -> Result<FetchReport, WastekitError> {
    use tracing::{info, warn};

    fs::create_dir_all(dest).map_err(|source| WastekitError::OutputNotCreatable {
        path: dest.to_path_buf(),
        source,
    })?;

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(opts.timeout))
        .build()
        .into();

    let mut report = FetchReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for raw in urls {
        if report.downloaded.len() >= opts.max_images {
            break;
        }

        let url = upscale_pin_url(raw);
        if !seen.insert(url.clone()) {
            report.duplicates += 1;
            continue;
        }

        let name = file_name_for_url(&url, report.downloaded.len() + 1);
        info!("downloading {}", name);

        let stored =
            download(&agent, &url).and_then(|bytes| store_image(dest, &name, &bytes, opts.min_bytes));
        match stored {
            Ok(StoreOutcome::Saved(path)) => {
                info!("saved {}", path.display());
                report.downloaded.push(path);
            }
            Ok(StoreOutcome::TooSmall { .. }) => report.too_small += 1,
            Err(err) => {
                warn!("{}", err);
                report.failures.push(FileFailure {
                    path: PathBuf::from(&url),
                    message: err.to_string(),
                });
            }
        }

        if !opts.delay.is_zero() {
            std::thread::sleep(opts.delay);
        }
    }

    info!("downloaded {} image(s)", report.downloaded.len());
    Ok(report)
}

#[cfg(feature = "fetch")]
fn download(agent: &ureq::Agent, url: &str) -> Result<Vec<u8>, WastekitError> {
    let fetch_err = |message: String| WastekitError::Fetch {
        url: url.to_string(),
        message,
    };

    let mut response = agent
        .get(url)
        .header("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| fetch_err(e.to_string()))?;

    response
        .body_mut()
        .read_to_vec()
        .map_err(|e| fetch_err(e.to_string()))
}

/// Count URLs that would be skipped as duplicates after upscaling.
pub fn count_duplicates(urls: &[String]) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    urls.iter()
        .filter(|url| !seen.insert(upscale_pin_url(url)))
        .count()
}
