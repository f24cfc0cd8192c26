//! Naive strategy: every kernel cell is visited for every pixel

use super::{BandKernel, Probe};
use crate::models::{BinaryImage, StructuringElement};

pub(crate) struct NaiveKernel<'a> {
    se: &'a StructuringElement,
}

impl<'a> NaiveKernel<'a> {
    pub fn new(se: &'a StructuringElement) -> Self {
        Self { se }
    }

    #[inline]
    fn hit(&self, src: &BinaryImage, x: usize, y: usize, target: u8) -> bool {
        let se = self.se;
        let (width, height) = (src.width() as isize, src.height() as isize);
        let data = src.as_bytes();

        for i in 0..se.height() {
            let ny = y as isize + i as isize - se.anchor_y() as isize;
            if ny < 0 || ny >= height {
                continue;
            }
            let row = ny as usize * src.width();
            for j in 0..se.width() {
                let nx = x as isize + j as isize - se.anchor_x() as isize;
                if nx < 0 || nx >= width {
                    continue;
                }
                if se.is_active(i, j) && data[row + nx as usize] == target {
                    return true;
                }
            }
        }
        false
    }
}

impl BandKernel for NaiveKernel<'_> {
    fn band_rows(&self) -> usize {
        1
    }

    fn fill_band(&self, src: &BinaryImage, probe: Probe, first_row: usize, band: &mut [u8]) {
        for (r, out_row) in band.chunks_mut(src.width()).enumerate() {
            let y = first_row + r;
            for (x, out) in out_row.iter_mut().enumerate() {
                *out = probe.resolve(self.hit(src, x, y, probe.target));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shape;

    #[test]
    fn test_naive_erosion_band() {
        // Foreground 3x3 block in a 5x5 image; erosion with a cross keeps only the center
        let mut src = BinaryImage::new(5, 5, 0).unwrap();
        for y in 1..4 {
            for x in 1..4 {
                src.set(x, y, 255);
            }
        }
        let se = StructuringElement::build(Shape::Disk, 1);
        let kernel = NaiveKernel::new(&se);
        let probe = Probe {
            target: 0,
            other: 255,
        };

        let mut out = vec![0u8; 25];
        kernel.fill_band(&src, probe, 0, &mut out);
        let fg: Vec<usize> = (0..25).filter(|&i| out[i] == 255).collect();
        assert_eq!(fg, vec![12]);
    }

    #[test]
    fn test_naive_partial_band() {
        let src = BinaryImage::new(4, 4, 255).unwrap();
        let se = StructuringElement::build(Shape::Square, 1);
        let kernel = NaiveKernel::new(&se);
        let probe = Probe {
            target: 255,
            other: 0,
        };

        // Only rows 2..3 are written
        let mut band = vec![7u8; 4];
        kernel.fill_band(&src, probe, 2, &mut band);
        assert_eq!(band, vec![255; 4]);
    }
}
