//! Synthetic binary images with random geometric shapes

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::models::{BinaryImage, Palette};

const HOLLOW_THICKNESS: usize = 10;

/// Kind of shape drawn into a synthetic image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    HollowRectangle,
    Circle,
    Ring,
    Line,
}

impl ShapeKind {
    const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::HollowRectangle,
        ShapeKind::Circle,
        ShapeKind::Ring,
        ShapeKind::Line,
    ];
}

/// Generator for batches of random binary images
pub struct SyntheticGenerator {
    rng: StdRng,
    width: usize,
    height: usize,
    palette: Palette,
    max_shapes: usize,
}

impl SyntheticGenerator {
    /// Create a generator; `seed = None` seeds from the OS
    pub fn new(
        width: usize,
        height: usize,
        palette: Palette,
        max_shapes: usize,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            width,
            height,
            palette,
            max_shapes: max_shapes.max(1),
        }
    }

    /// Generate `count` images named `image_1.jpg`, `image_2.jpg`, ...
    pub fn generate(&mut self, count: usize) -> Result<Vec<BinaryImage>> {
        (1..=count)
            .map(|i| Ok(self.next_image()?.with_source(format!("image_{}.jpg", i))))
            .collect()
    }

    /// One image with 1..=max_shapes random shapes
    pub fn next_image(&mut self) -> Result<BinaryImage> {
        let mut image = BinaryImage::new(self.width, self.height, self.palette.background)?;
        let shapes = self.rng.random_range(1..=self.max_shapes);
        for _ in 0..shapes {
            let kind = ShapeKind::ALL[self.rng.random_range(0..ShapeKind::ALL.len())];
            self.draw_random(&mut image, kind);
        }
        Ok(image)
    }

    fn pick(&mut self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            self.rng.random_range(0..bound)
        }
    }

    fn draw_random(&mut self, image: &mut BinaryImage, kind: ShapeKind) {
        let (w, h) = (self.width, self.height);
        let fg = self.palette.foreground;
        match kind {
            ShapeKind::Rectangle => {
                let x = self.pick(w.saturating_sub(50));
                let y = self.pick(h.saturating_sub(50));
                let rw = self.pick(w - x);
                let rh = self.pick(h - y);
                draw_rectangle(image, x as isize, y as isize, rw, rh, fg);
            }
            ShapeKind::HollowRectangle => {
                let x = self.pick(w.saturating_sub(100));
                let y = self.pick(h.saturating_sub(100));
                let rw = self.pick(100) + 40;
                let rh = self.pick(100) + 40;
                draw_hollow_rectangle(image, x as isize, y as isize, rw, rh, HOLLOW_THICKNESS, fg);
            }
            ShapeKind::Circle => {
                let cx = self.pick(w.saturating_sub(50));
                let cy = self.pick(h.saturating_sub(50));
                let radius = self.pick(50) + 10;
                draw_ring(image, cx as isize, cy as isize, radius, 0, fg);
            }
            ShapeKind::Ring => {
                let cx = self.pick(w.saturating_sub(50));
                let cy = self.pick(h.saturating_sub(50));
                let outer = self.pick(50) + 30;
                let inner = self.pick(outer - 10) + 10;
                draw_ring(image, cx as isize, cy as isize, outer, inner, fg);
            }
            ShapeKind::Line => {
                let x1 = self.pick(w) as isize;
                let y1 = self.pick(h) as isize;
                let x2 = self.pick(w) as isize;
                let y2 = self.pick(h) as isize;
                draw_line(image, (x1, y1), (x2, y2), fg);
            }
        }
    }
}

fn set_clipped(image: &mut BinaryImage, x: isize, y: isize, value: u8) {
    if x >= 0 && y >= 0 {
        image.set(x as usize, y as usize, value);
    }
}

/// Filled axis-aligned rectangle, clipped to the image
pub fn draw_rectangle(image: &mut BinaryImage, x: isize, y: isize, w: usize, h: usize, value: u8) {
    for yy in y..y + h as isize {
        for xx in x..x + w as isize {
            set_clipped(image, xx, yy, value);
        }
    }
}

/// Rectangle outline of the given thickness
pub fn draw_hollow_rectangle(
    image: &mut BinaryImage,
    x: isize,
    y: isize,
    w: usize,
    h: usize,
    thickness: usize,
    value: u8,
) {
    let t = thickness as isize;
    draw_rectangle(image, x, y, w, thickness, value);
    draw_rectangle(image, x, y + h as isize - t, w, thickness, value);
    draw_rectangle(image, x, y, thickness, h, value);
    draw_rectangle(image, x + w as isize - t, y, thickness, h, value);
}

/// Pixels with `inner² <= d² <= outer²` from the center; `inner = 0` fills a disk
pub fn draw_ring(image: &mut BinaryImage, cx: isize, cy: isize, outer: usize, inner: usize, value: u8) {
    let (outer, inner) = (outer as isize, inner as isize);
    for y in cy - outer..=cy + outer {
        for x in cx - outer..=cx + outer {
            let d2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
            if d2 <= outer * outer && d2 >= inner * inner {
                set_clipped(image, x, y, value);
            }
        }
    }
}

/// Bresenham line between two points
pub fn draw_line(image: &mut BinaryImage, from: (isize, isize), to: (isize, isize), value: u8) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = (to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        set_clipped(image, x, y, value);
        if (x, y) == to {
            break;
        }
        let e2 = err * 2;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let palette = Palette::default();
        let a = SyntheticGenerator::new(64, 48, palette, 3, Some(7))
            .generate(3)
            .unwrap();
        let b = SyntheticGenerator::new(64, 48, palette, 3, Some(7))
            .generate(3)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a[2].source(), "image_3.jpg");
        for image in &a {
            assert_eq!((image.width(), image.height()), (64, 48));
            image.validate(&palette).unwrap();
        }
    }

    #[test]
    fn test_tiny_images_do_not_panic() {
        let mut generator = SyntheticGenerator::new(3, 2, Palette::default(), 5, Some(1));
        for _ in 0..50 {
            generator.next_image().unwrap();
        }
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut image = BinaryImage::new(4, 4, 0).unwrap();
        draw_line(&mut image, (0, 0), (3, 3), 255);
        assert_eq!(image.count(255), 4);
        for i in 0..4 {
            assert_eq!(image.get(i, i), Some(255));
        }
    }

    #[test]
    fn test_hollow_rectangle_has_hole() {
        let mut image = BinaryImage::new(20, 20, 0).unwrap();
        draw_hollow_rectangle(&mut image, 2, 2, 12, 12, 3, 255);
        assert_eq!(image.get(2, 2), Some(255));
        assert_eq!(image.get(8, 8), Some(0));
        assert_eq!(image.get(13, 8), Some(255));
        // 12*12 outer - 6*6 hole
        assert_eq!(image.count(255), 144 - 36);
    }

    #[test]
    fn test_ring_clipped_at_border() {
        let mut image = BinaryImage::new(10, 10, 0).unwrap();
        draw_ring(&mut image, 0, 0, 3, 0, 255);
        // Quarter disk of radius 3: (x, y) >= 0 with x² + y² <= 9
        assert_eq!(image.count(255), 11);
    }
}
