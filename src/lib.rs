//! morph_bench - binary morphology engine and benchmark
//!
//! Erosion, dilation, opening and closing of binary images with three
//! interchangeable strategies (naive kernel scan, active-offset list, tiled
//! traversal), each runnable sequentially or on a Rayon worker pool, plus the
//! driver that times them over a synthetic batch and writes speedup tables.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Error type and result alias
#[allow(missing_docs)]
pub mod error;
/// Core data structures (BinaryImage, Palette, StructuringElement)
pub mod models;
/// Morphological operator engine (strategies, execution modes, batches)
pub mod morphology;
/// Benchmark driver
pub mod pipeline;
/// Image I/O, dataset helpers and reports
#[allow(missing_docs)]
pub mod tools;
/// Configuration and synthetic image generation
#[allow(missing_docs)]
pub mod utils;

pub use error::{MorphError, Result};
pub use models::{BinaryImage, Offset, Palette, Shape, StructuringElement};
pub use morphology::{
    BatchSchedule, Engine, ExecutionMode, MorphConfig, Operator, Strategy,
};

/// Erode with default settings (0/255 palette, offset list, sequential)
///
/// # Example
/// ```
/// use morph_bench::{BinaryImage, Shape, StructuringElement};
///
/// let image = BinaryImage::new(16, 16, 255).unwrap();
/// let se = StructuringElement::build(Shape::Disk, 2);
/// let eroded = morph_bench::erode(&image, &se).unwrap();
/// assert_eq!(eroded.count(255), 16 * 16);
/// ```
pub fn erode(image: &BinaryImage, se: &StructuringElement) -> Result<BinaryImage> {
    apply_default(Operator::Erode, image, se)
}

/// Dilate with default settings
pub fn dilate(image: &BinaryImage, se: &StructuringElement) -> Result<BinaryImage> {
    apply_default(Operator::Dilate, image, se)
}

/// Open with default settings
pub fn open(image: &BinaryImage, se: &StructuringElement) -> Result<BinaryImage> {
    apply_default(Operator::Open, image, se)
}

/// Close with default settings
pub fn close(image: &BinaryImage, se: &StructuringElement) -> Result<BinaryImage> {
    apply_default(Operator::Close, image, se)
}

fn apply_default(
    operator: Operator,
    image: &BinaryImage,
    se: &StructuringElement,
) -> Result<BinaryImage> {
    Engine::default().apply(
        operator,
        image,
        se,
        Strategy::OffsetList,
        ExecutionMode::Sequential,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_operators() {
        let mut image = BinaryImage::new(12, 12, 0).unwrap();
        image.set(6, 6, 255);
        let se = StructuringElement::build(Shape::Square, 1);

        assert_eq!(dilate(&image, &se).unwrap().count(255), 9);
        assert_eq!(erode(&image, &se).unwrap().count(255), 0);
        assert_eq!(open(&image, &se).unwrap().count(255), 0);
        assert_eq!(close(&image, &se).unwrap(), image);
    }
}
