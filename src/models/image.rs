use crate::error::{MorphError, Result};

/// The two admissible pixel values of a binary image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Value of background pixels
    pub background: u8,
    /// Value of foreground pixels
    pub foreground: u8,
}

impl Palette {
    /// Create a palette from background and foreground values
    pub fn new(background: u8, foreground: u8) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Map an arbitrary byte to the nearest palette value.
    ///
    /// Ties go to the foreground. Used at the codec boundary where lossy
    /// formats produce intermediate values.
    pub fn snap(&self, value: u8) -> u8 {
        let to_bg = value.abs_diff(self.background);
        let to_fg = value.abs_diff(self.foreground);
        if to_fg <= to_bg {
            self.foreground
        } else {
            self.background
        }
    }

    /// Whether the value is one of the two admissible values
    pub fn contains(&self, value: u8) -> bool {
        value == self.background || value == self.foreground
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(0, 255)
    }
}

/// Single-channel binary image with an owned pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
    source: String,
}

impl BinaryImage {
    /// Create an image filled with `fill`
    pub fn new(width: usize, height: usize, fill: u8) -> Result<Self> {
        let data = alloc_filled(pixel_count(width, height)?, fill)?;
        Ok(Self {
            width,
            height,
            data,
            source: String::new(),
        })
    }

    /// Wrap an existing row-major buffer
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != pixel_count(width, height)? {
            return Err(MorphError::BufferSize {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            source: String::new(),
        })
    }

    /// Attach a source name (used as batch key)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of channels (always 1)
    pub fn channels(&self) -> usize {
        1
    }

    /// Source name of the image, empty if none was set
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Pixel at (x, y), `None` outside the image
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Set pixel at (x, y); out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = value;
    }

    /// Fill every pixel with `value`
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Raw row-major pixel data
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image and return its buffer
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Count pixels equal to `value`
    pub fn count(&self, value: u8) -> usize {
        self.data.iter().filter(|&&v| v == value).count()
    }

    /// Check the binary invariant against a palette
    pub fn validate(&self, palette: &Palette) -> Result<()> {
        match self.data.iter().position(|&v| !palette.contains(v)) {
            Some(idx) => Err(MorphError::NonBinaryPixel {
                x: idx % self.width,
                y: idx / self.width,
                value: self.data[idx],
                background: palette.background,
                foreground: palette.foreground,
            }),
            None => Ok(()),
        }
    }

    /// Swap background and foreground pixels
    pub fn complement(&self, palette: &Palette) -> Result<Self> {
        let mut data = alloc_filled(self.data.len(), palette.background)?;
        for (dst, &src) in data.iter_mut().zip(&self.data) {
            if src == palette.background {
                *dst = palette.foreground;
            }
        }
        Ok(Self {
            width: self.width,
            height: self.height,
            data,
            source: self.source.clone(),
        })
    }
}

/// Pixel count of a non-empty image whose size fits in `usize`
fn pixel_count(width: usize, height: usize) -> Result<usize> {
    match width.checked_mul(height) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(MorphError::InvalidDimensions { width, height }),
    }
}

/// Allocate a buffer without aborting on out-of-memory
pub(crate) fn alloc_filled(len: usize, fill: u8) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| MorphError::Allocation { bytes: len })?;
    data.resize(len, fill);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_image() {
        let mut image = BinaryImage::new(8, 6, 0).unwrap();
        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 6);
        assert_eq!(image.channels(), 1);

        image.set(3, 4, 255);
        assert_eq!(image.get(3, 4), Some(255));
        assert_eq!(image.get(3, 3), Some(0));
        assert_eq!(image.count(255), 1);

        image.fill(0);
        assert_eq!(image.get(3, 4), Some(0));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut image = BinaryImage::new(8, 8, 0).unwrap();
        image.set(10, 10, 255); // Should not panic
        assert_eq!(image.get(10, 10), None);
        assert_eq!(image.count(255), 0);
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = BinaryImage::from_raw(4, 4, vec![0; 15]).unwrap_err();
        assert!(matches!(err, MorphError::BufferSize { actual: 15, .. }));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        for (width, height) in [(0, 5), (5, 0), (0, 0)] {
            assert!(matches!(
                BinaryImage::new(width, height, 0),
                Err(MorphError::InvalidDimensions { .. })
            ));
        }
        assert!(matches!(
            BinaryImage::from_raw(0, 0, vec![]),
            Err(MorphError::InvalidDimensions { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let err = BinaryImage::new(1usize << 63, 2, 0).unwrap_err();
        assert!(matches!(
            err,
            MorphError::InvalidDimensions { height: 2, .. }
        ));
        let err = BinaryImage::from_raw(usize::MAX, 3, vec![0; 4]).unwrap_err();
        assert!(matches!(err, MorphError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_rows() {
        let image = BinaryImage::from_raw(3, 2, vec![0, 255, 0, 255, 255, 0]).unwrap();
        assert_eq!(image.row(0), &[0, 255, 0]);
        assert_eq!(image.row(1), &[255, 255, 0]);
    }

    #[test]
    fn test_clone_owns_buffer() {
        let original = BinaryImage::new(4, 4, 0).unwrap().with_source("a.jpg");
        let mut copy = original.clone();
        copy.set(0, 0, 255);
        assert_eq!(original.get(0, 0), Some(0));
        assert_eq!(copy.source(), "a.jpg");
    }

    #[test]
    fn test_validate_reports_first_stray_pixel() {
        let image = BinaryImage::from_raw(3, 2, vec![0, 255, 0, 0, 17, 255]).unwrap();
        let err = image.validate(&Palette::default()).unwrap_err();
        assert!(matches!(
            err,
            MorphError::NonBinaryPixel {
                x: 1,
                y: 1,
                value: 17,
                ..
            }
        ));
    }

    #[test]
    fn test_palette_snap() {
        let palette = Palette::default();
        assert_eq!(palette.snap(3), 0);
        assert_eq!(palette.snap(250), 255);
        assert_eq!(palette.snap(128), 255);
        assert_eq!(palette.snap(127), 0);
    }

    #[test]
    fn test_complement() {
        let palette = Palette::default();
        let image = BinaryImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let inverted = image.complement(&palette).unwrap();
        assert_eq!(inverted.as_bytes(), &[255, 0]);
    }
}
