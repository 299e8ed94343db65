//! Dataset descriptor (`dataset.yaml`) for YOLO training tools.
//!
//! The descriptor points a trainer at the split produced by
//! [`crate::split`]:
//!
//! ```yaml
//! path: data/labeled_data
//! train: train/images
//! val: valid/images
//! nc: 5
//! names:
//! - plastic
//! - paper
//! - metal
//! - glass
//! - organic
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::WastekitError;
use crate::label::CLASS_NAMES;
use crate::split::Bucket;

pub const DESCRIPTOR_FILE_NAME: &str = "dataset.yaml";

/// Contents of the descriptor file. Field order is the file's key order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Dataset root, as given by the caller.
    pub path: String,
    /// Training images, relative to `path`.
    pub train: String,
    /// Validation images, relative to `path`.
    pub val: String,
    /// Number of classes; always `names.len()`.
    pub nc: usize,
    /// Class names in `class_id` order.
    pub names: Vec<String>,
}

impl DatasetDescriptor {
    pub fn new(output_dir: &Path, names: &[&str]) -> Self {
        Self {
            path: output_dir.to_string_lossy().replace('\\', "/"),
            train: relative_images(Bucket::Train),
            val: relative_images(Bucket::Valid),
            nc: names.len(),
            names: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Descriptor for the built-in waste classes.
    pub fn waste(output_dir: &Path) -> Self {
        Self::new(output_dir, &CLASS_NAMES)
    }
}

fn relative_images(bucket: Bucket) -> String {
    format!("{}/images", bucket.dir_name())
}

/// Write `<output_dir>/dataset.yaml` and return its path.
pub fn write_descriptor(output_dir: &Path, names: &[&str]) -> Result<PathBuf, WastekitError> {
    let descriptor = DatasetDescriptor::new(output_dir, names);
    let path = output_dir.join(DESCRIPTOR_FILE_NAME);

    let yaml =
        serde_yaml::to_string(&descriptor).map_err(|source| WastekitError::DescriptorWrite {
            path: path.clone(),
            source,
        })?;

    fs::create_dir_all(output_dir).map_err(|source| WastekitError::OutputNotCreatable {
        path: output_dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, yaml).map_err(WastekitError::Io)?;

    info!("wrote dataset descriptor {}", path.display());
    Ok(path)
}

/// Read a descriptor back from disk.
pub fn read_descriptor(path: &Path) -> Result<DatasetDescriptor, WastekitError> {
    let data = fs::read_to_string(path).map_err(WastekitError::Io)?;
    serde_yaml::from_str(&data).map_err(|source| WastekitError::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })
}
