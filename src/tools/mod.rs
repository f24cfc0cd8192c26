//! Image I/O and dataset helpers used by the benchmark driver and CLI

pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MorphError, Result};
use crate::models::{BinaryImage, Palette};

/// Decode an image file into a binary image.
///
/// The file is converted to 8-bit luma and every pixel is snapped to the
/// nearest palette value, so lossy formats still satisfy the binary
/// invariant. The source name is the path as given.
pub fn load_binary<P: AsRef<Path>>(path: P, palette: &Palette) -> Result<BinaryImage> {
    let path = path.as_ref();
    let luma = image::open(path)
        .map_err(|source| MorphError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    let data = luma.into_raw().into_iter().map(|v| palette.snap(v)).collect();
    Ok(BinaryImage::from_raw(width, height, data)?.with_source(path.to_string_lossy()))
}

/// Encode a binary image; the format follows the file extension
pub fn save_binary<P: AsRef<Path>>(image: &BinaryImage, path: P) -> Result<()> {
    let path = path.as_ref();
    image::save_buffer(
        path,
        image.as_bytes(),
        image.width() as u32,
        image.height() as u32,
        image::ColorType::L8,
    )
    .map_err(|source| MorphError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Create a directory and all of its parents
pub fn create_dirs<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(path.as_ref())?;
    Ok(())
}

/// Path of the i-th batch image (1-based) inside `dir`
pub fn batch_path<P: AsRef<Path>>(dir: P, index: usize) -> PathBuf {
    dir.as_ref().join(format!("image_{}.jpg", index))
}

/// Save a batch as `image_1.jpg .. image_N.jpg`
pub fn save_batch<P: AsRef<Path>>(images: &[BinaryImage], dir: P) -> Result<()> {
    let dir = dir.as_ref();
    create_dirs(dir)?;
    for (i, image) in images.iter().enumerate() {
        save_binary(image, batch_path(dir, i + 1))?;
    }
    debug!("Saved {} images to {}", images.len(), dir.display());
    Ok(())
}

/// Load `image_1.jpg .. image_N.jpg` from `dir`.
///
/// Files that fail to decode are logged and skipped.
pub fn load_batch<P: AsRef<Path>>(dir: P, count: usize, palette: &Palette) -> Vec<BinaryImage> {
    let dir = dir.as_ref();
    let mut images = Vec::with_capacity(count);
    for i in 1..=count {
        let path = batch_path(dir, i);
        match load_binary(&path, palette) {
            Ok(image) => images.push(image),
            Err(err) => warn!("Skipping {}: {}", path.display(), err),
        }
    }
    images
}

/// Save each result under `dir`, named after the file name of its source
pub fn save_outputs<'a, I, P>(outputs: I, dir: P) -> Result<()>
where
    I: IntoIterator<Item = &'a BinaryImage>,
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    create_dirs(dir)?;
    for image in outputs {
        let name = Path::new(image.source())
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "output.jpg".into());
        save_binary(image, dir.join(name))?;
    }
    Ok(())
}

/// Summary statistics for a binary image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryStats {
    /// Count of foreground pixels
    pub foreground_pixels: usize,
    /// Total pixels in the image
    pub total_pixels: usize,
    /// Ratio of foreground pixels to total pixels
    pub foreground_ratio: f64,
}

/// Compute foreground pixel stats for a binary image
pub fn binary_stats(image: &BinaryImage, palette: &Palette) -> BinaryStats {
    let foreground = image.count(palette.foreground);
    let total = image.width() * image.height();
    let ratio = if total == 0 {
        0.0
    } else {
        foreground as f64 / total as f64
    };
    BinaryStats {
        foreground_pixels: foreground,
        total_pixels: total,
        foreground_ratio: ratio,
    }
}
