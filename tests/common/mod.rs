#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const VALID_LINE: &str = "0 0.500000 0.500000 0.300000 0.300000";

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Write a small image whose bytes encode `stem`, so copies can be traced.
pub fn write_image(dir: &Path, file_name: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create image dir");
    let path = dir.join(file_name);
    fs::write(&path, format!("image:{file_name}")).expect("write image");
    path
}

pub fn write_label(dir: &Path, stem: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create label dir");
    let path = dir.join(format!("{stem}.txt"));
    fs::write(&path, content).expect("write label");
    path
}

/// `count` labeled pairs named `img_000.jpg`/`img_000.txt` and so on.
pub fn write_pairs(dir: &Path, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let stem = format!("img_{i:03}");
            write_image(dir, &format!("{stem}.jpg"));
            write_label(dir, &stem, &format!("{}\n", VALID_LINE));
            stem
        })
        .collect()
}

/// Sorted file names directly inside `dir`; empty when it does not exist.
pub fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Sorted stems directly inside `dir`.
pub fn stems(dir: &Path) -> Vec<String> {
    let mut stems: Vec<String> = file_names(dir)
        .iter()
        .map(|name| {
            Path::new(name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();
    stems.sort();
    stems
}
