//! Offset-list strategy: only active kernel cells are visited
//!
//! The element's active offsets are additionally flattened into linear buffer
//! offsets for the image width. Pixels whose whole neighbourhood lies inside
//! the image use the linear offsets without bounds checks; pixels near the
//! border fall back to checked (dy, dx) offsets.

use super::{BandKernel, Probe};
use crate::models::{BinaryImage, Offset, StructuringElement};

/// Active offsets of an element, resolved for one image size
pub(crate) struct Neighborhood<'a> {
    offsets: &'a [Offset],
    linear: Vec<isize>,
    width: usize,
    height: usize,
    left: usize,
    right: usize,
    top: usize,
    bottom: usize,
}

impl<'a> Neighborhood<'a> {
    pub fn new(se: &'a StructuringElement, width: usize, height: usize) -> Self {
        let offsets = se.offsets();
        let linear = offsets
            .iter()
            .map(|o| o.dy * width as isize + o.dx)
            .collect();

        let reach =
            |f: fn(&Offset) -> isize| offsets.iter().map(f).max().unwrap_or(0).max(0) as usize;

        Self {
            offsets,
            linear,
            width,
            height,
            left: reach(|o| -o.dx),
            right: reach(|o| o.dx),
            top: reach(|o| -o.dy),
            bottom: reach(|o| o.dy),
        }
    }

    #[inline]
    fn is_interior(&self, x: usize, y: usize) -> bool {
        x >= self.left
            && y >= self.top
            && x + self.right < self.width
            && y + self.bottom < self.height
    }

    /// Whether any active neighbour of (x, y) inside the image equals `target`
    #[inline]
    pub fn hit(&self, data: &[u8], x: usize, y: usize, target: u8) -> bool {
        if self.is_interior(x, y) {
            let idx = (y * self.width + x) as isize;
            return self
                .linear
                .iter()
                .any(|&d| data[(idx + d) as usize] == target);
        }

        let (width, height) = (self.width as isize, self.height as isize);
        self.offsets.iter().any(|o| {
            let nx = x as isize + o.dx;
            let ny = y as isize + o.dy;
            nx >= 0
                && ny >= 0
                && nx < width
                && ny < height
                && data[ny as usize * self.width + nx as usize] == target
        })
    }
}

pub(crate) struct OffsetListKernel<'a> {
    neighborhood: Neighborhood<'a>,
}

impl<'a> OffsetListKernel<'a> {
    pub fn new(se: &'a StructuringElement, width: usize, height: usize) -> Self {
        Self {
            neighborhood: Neighborhood::new(se, width, height),
        }
    }
}

impl BandKernel for OffsetListKernel<'_> {
    fn band_rows(&self) -> usize {
        1
    }

    fn fill_band(&self, src: &BinaryImage, probe: Probe, first_row: usize, band: &mut [u8]) {
        let data = src.as_bytes();
        for (r, out_row) in band.chunks_mut(src.width()).enumerate() {
            let y = first_row + r;
            for (x, out) in out_row.iter_mut().enumerate() {
                *out = probe.resolve(self.neighborhood.hit(data, x, y, probe.target));
            }
        }
    }
}
