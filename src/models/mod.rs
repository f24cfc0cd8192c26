/// Structuring elements (square, disk, explicit kernels)
pub mod element;
/// Binary images and their two-value palette
pub mod image;

pub use element::{Offset, Shape, StructuringElement};
pub use image::{BinaryImage, Palette};
