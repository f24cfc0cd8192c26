//! Tiled strategy: offset-list hit test over square pixel tiles
//!
//! The tile grid is anchored at the image origin. A parallel band is exactly
//! one row of tiles, so sequential and parallel runs visit the same tiles.

use super::offset_list::Neighborhood;
use super::{BandKernel, Probe};
use crate::models::{BinaryImage, StructuringElement};

pub(crate) struct TiledKernel<'a> {
    neighborhood: Neighborhood<'a>,
    tile: usize,
}

impl<'a> TiledKernel<'a> {
    pub fn new(se: &'a StructuringElement, width: usize, height: usize, tile: usize) -> Self {
        Self {
            neighborhood: Neighborhood::new(se, width, height),
            tile: tile.max(1),
        }
    }
}

impl BandKernel for TiledKernel<'_> {
    fn band_rows(&self) -> usize {
        self.tile
    }

    fn fill_band(&self, src: &BinaryImage, probe: Probe, first_row: usize, band: &mut [u8]) {
        let width = src.width();
        let rows = band.len() / width;
        let data = src.as_bytes();

        for ty in (0..rows).step_by(self.tile) {
            let ty_end = (ty + self.tile).min(rows);
            for tx in (0..width).step_by(self.tile) {
                let tx_end = (tx + self.tile).min(width);
                for r in ty..ty_end {
                    let y = first_row + r;
                    let out_row = &mut band[r * width..(r + 1) * width];
                    for x in tx..tx_end {
                        out_row[x] =
                            probe.resolve(self.neighborhood.hit(data, x, y, probe.target));
                    }
                }
            }
        }
    }
}
