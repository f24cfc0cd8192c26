//! Structuring element definitions for morphological operations
//!
//! A structuring element is a binary kernel with an anchor at its center.
//! The active cells are also kept as a flat list of offsets relative to the
//! anchor, which the offset-list and tiled strategies iterate directly.

use std::fmt;
use std::str::FromStr;

use crate::error::{MorphError, Result};
use crate::models::image::{BinaryImage, Palette};

/// Shape of a generated structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Full square, side = 2 * radius + 1
    Square,
    /// Disk, cells with di² + dj² <= radius²
    Disk,
}

impl Shape {
    /// Lowercase name used in configuration and report labels
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Square => "square",
            Shape::Disk => "disk",
        }
    }
}

impl FromStr for Shape {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(Shape::Square),
            "disk" | "circle" => Ok(Shape::Disk),
            _ => Err(MorphError::InvalidShape(s.to_string())),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Active kernel cell, relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// Row offset
    pub dy: isize,
    /// Column offset
    pub dx: isize,
}

/// Binary structuring element with a centered anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: usize,
    height: usize,
    anchor_x: usize,
    anchor_y: usize,
    kernel: Vec<bool>,
    offsets: Vec<Offset>,
}

impl StructuringElement {
    /// Build a `(2r+1) x (2r+1)` square or disk element
    pub fn build(shape: Shape, radius: usize) -> Self {
        let size = 2 * radius + 1;
        let r = radius as isize;
        let mut kernel = Vec::with_capacity(size * size);
        for i in -r..=r {
            for j in -r..=r {
                let active = match shape {
                    Shape::Square => true,
                    Shape::Disk => i * i + j * j <= r * r,
                };
                kernel.push(active);
            }
        }
        Self::from_cells(size, size, kernel)
    }

    /// Build an element from explicit {0, 1} rows
    pub fn from_kernel(rows: &[Vec<u8>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(MorphError::InvalidKernel("kernel is empty".to_string()));
        }

        let mut kernel = Vec::with_capacity(width * height);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MorphError::InvalidKernel(format!(
                    "row {} has length {}, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            for &cell in row {
                match cell {
                    0 => kernel.push(false),
                    1 => kernel.push(true),
                    other => {
                        return Err(MorphError::InvalidKernel(format!(
                            "cell value {} in row {} is not 0 or 1",
                            other, i
                        )));
                    }
                }
            }
        }

        Ok(Self::from_cells(width, height, kernel))
    }

    fn from_cells(width: usize, height: usize, kernel: Vec<bool>) -> Self {
        let anchor_x = width / 2;
        let anchor_y = height / 2;
        let offsets = kernel
            .iter()
            .enumerate()
            .filter(|&(_, &active)| active)
            .map(|(idx, _)| Offset {
                dy: (idx / width) as isize - anchor_y as isize,
                dx: (idx % width) as isize - anchor_x as isize,
            })
            .collect();

        Self {
            width,
            height,
            anchor_x,
            anchor_y,
            kernel,
            offsets,
        }
    }

    /// Kernel width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Kernel height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Anchor column
    pub fn anchor_x(&self) -> usize {
        self.anchor_x
    }

    /// Anchor row
    pub fn anchor_y(&self) -> usize {
        self.anchor_y
    }

    /// Whether kernel cell (row, col) is active
    #[inline]
    pub fn is_active(&self, row: usize, col: usize) -> bool {
        self.kernel[row * self.width + col]
    }

    /// Active cells relative to the anchor, in row-major kernel order
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Kernel as {0, 1} rows
    pub fn kernel_rows(&self) -> Vec<Vec<u8>> {
        self.kernel
            .chunks(self.width)
            .map(|row| row.iter().map(|&active| active as u8).collect())
            .collect()
    }

    /// Whether the element equals its own reflection through the anchor
    pub fn is_symmetric(&self) -> bool {
        let mut sorted: Vec<(isize, isize)> = self.offsets.iter().map(|o| (o.dy, o.dx)).collect();
        let mut reflected: Vec<(isize, isize)> =
            self.offsets.iter().map(|o| (-o.dy, -o.dx)).collect();
        sorted.sort_unstable();
        reflected.sort_unstable();
        sorted == reflected
    }

    /// Render the kernel as an image (active cells in foreground)
    pub fn to_image(&self, palette: &Palette) -> Result<BinaryImage> {
        let data = self
            .kernel
            .iter()
            .map(|&active| {
                if active {
                    palette.foreground
                } else {
                    palette.background
                }
            })
            .collect();
        BinaryImage::from_raw(self.width, self.height, data)
    }
}

impl fmt::Display for StructuringElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.kernel.chunks(self.width) {
            let line: Vec<&str> = row.iter().map(|&a| if a { "1" } else { "0" }).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_element() {
        let se = StructuringElement::build(Shape::Square, 1);
        assert_eq!(se.width(), 3);
        assert_eq!(se.height(), 3);
        assert_eq!(se.anchor_x(), 1);
        assert_eq!(se.anchor_y(), 1);
        assert_eq!(se.offsets().len(), 9);
        assert_eq!(se.offsets()[0], Offset { dy: -1, dx: -1 });
        assert_eq!(se.offsets()[8], Offset { dy: 1, dx: 1 });
    }

    #[test]
    fn test_disk_radius_one_is_cross() {
        let se = StructuringElement::build(Shape::Disk, 1);
        assert_eq!(
            se.kernel_rows(),
            vec![vec![0, 1, 0], vec![1, 1, 1], vec![0, 1, 0]]
        );
        assert_eq!(se.offsets().len(), 5);
    }

    #[test]
    fn test_disk_includes_boundary() {
        // (0, ±2) and (±2, 0) lie exactly on the circle
        let se = StructuringElement::build(Shape::Disk, 2);
        let rows = se.kernel_rows();
        assert_eq!(rows[0], vec![0, 0, 1, 0, 0]);
        assert_eq!(rows[2], vec![1, 1, 1, 1, 1]);
        assert_eq!(rows[1], vec![0, 1, 1, 1, 0]);
        assert_eq!(se.offsets().len(), 13);
    }

    #[test]
    fn test_radius_zero() {
        let se = StructuringElement::build(Shape::Disk, 0);
        assert_eq!(se.width(), 1);
        assert_eq!(se.offsets(), &[Offset { dy: 0, dx: 0 }]);
    }

    #[test]
    fn test_shape_parsing() {
        assert_eq!("square".parse::<Shape>().unwrap(), Shape::Square);
        assert_eq!("Disk".parse::<Shape>().unwrap(), Shape::Disk);
        assert_eq!("circle".parse::<Shape>().unwrap(), Shape::Disk);
        assert!(matches!(
            "hexagon".parse::<Shape>(),
            Err(MorphError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_from_kernel_validation() {
        assert!(StructuringElement::from_kernel(&[]).is_err());
        assert!(StructuringElement::from_kernel(&[vec![1, 1], vec![1]]).is_err());
        assert!(StructuringElement::from_kernel(&[vec![2]]).is_err());

        let se = StructuringElement::from_kernel(&[vec![1, 1, 0]]).unwrap();
        assert_eq!(se.anchor_x(), 1);
        assert_eq!(se.anchor_y(), 0);
        assert_eq!(
            se.offsets(),
            &[Offset { dy: 0, dx: -1 }, Offset { dy: 0, dx: 0 }]
        );
        assert!(!se.is_symmetric());
    }

    #[test]
    fn test_generated_elements_are_symmetric() {
        for radius in 0..5 {
            assert!(StructuringElement::build(Shape::Disk, radius).is_symmetric());
            assert!(StructuringElement::build(Shape::Square, radius).is_symmetric());
        }
    }

    #[test]
    fn test_display() {
        let se = StructuringElement::build(Shape::Disk, 1);
        assert_eq!(se.to_string(), "0 1 0\n1 1 1\n0 1 0\n");
    }
}
