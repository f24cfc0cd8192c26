//! Benchmark configuration loaded from JSON

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};
use crate::models::{Palette, Shape, StructuringElement};
use crate::morphology::MorphConfig;

/// Pixel dimensions of generated images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

/// Structuring element settings as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// "square" or "disk"
    pub shape: String,
    pub radius: usize,
}

/// Full benchmark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub image_size: ImageSize,
    pub num_images: usize,
    #[serde(default)]
    pub background_color: u8,
    #[serde(default = "default_foreground")]
    pub foreground_color: u8,
    pub structuring_element: ElementConfig,
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,
    /// Maximum number of random shapes per generated image
    #[serde(default = "default_shape_per_image")]
    pub shape_per_image: usize,
    /// Thread counts benchmarked in parallel mode
    #[serde(default = "default_thread_counts")]
    pub thread_counts: Vec<usize>,
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Write every operator's output next to the generated batch
    #[serde(default)]
    pub save_outputs: bool,
    /// Seed for the synthetic generator; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_foreground() -> u8 {
    255
}

fn default_tile_size() -> usize {
    32
}

fn default_shape_per_image() -> usize {
    3
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

/// Powers of two up to the number of available cores (always includes 1)
pub fn default_thread_counts() -> Vec<usize> {
    let max = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let mut counts = Vec::new();
    let mut t = 1;
    while t < max {
        counts.push(t);
        t *= 2;
    }
    counts.push(max);
    counts
}

impl BenchConfig {
    /// Read and validate a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config string
    pub fn from_json(text: &str) -> Result<Self> {
        let config: BenchConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(invalid(
                "image_size",
                format!(
                    "{}x{} has no pixels",
                    self.image_size.width, self.image_size.height
                ),
            ));
        }
        if self.num_images == 0 {
            return Err(invalid("num_images", "must be at least 1".to_string()));
        }
        if self.background_color == self.foreground_color {
            return Err(invalid(
                "foreground_color",
                format!("equals background_color ({})", self.background_color),
            ));
        }
        if self.tile_size == 0 {
            return Err(invalid("tile_size", "must be at least 1".to_string()));
        }
        if self.thread_counts.is_empty() || self.thread_counts.contains(&0) {
            return Err(invalid(
                "thread_counts",
                format!("{:?} must be non-empty and positive", self.thread_counts),
            ));
        }
        Ok(())
    }

    /// Background/foreground values
    pub fn palette(&self) -> Palette {
        Palette::new(self.background_color, self.foreground_color)
    }

    /// Engine settings derived from this config
    pub fn morph_config(&self) -> MorphConfig {
        MorphConfig {
            palette: self.palette(),
            tile_size: self.tile_size,
        }
    }

    /// Parsed structuring element shape
    pub fn shape(&self) -> Result<Shape> {
        self.structuring_element.shape.parse()
    }

    /// Build the configured structuring element
    pub fn structuring_element(&self) -> Result<StructuringElement> {
        Ok(StructuringElement::build(
            self.shape()?,
            self.structuring_element.radius,
        ))
    }

    /// Run label, e.g. `400x400_disk1`
    pub fn run_label(&self) -> Result<String> {
        Ok(format!(
            "{}x{}_{}{}",
            self.image_size.width,
            self.image_size.height,
            self.shape()?,
            self.structuring_element.radius
        ))
    }
}

fn invalid(name: &'static str, reason: String) -> MorphError {
    MorphError::InvalidConfig { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "image_size": { "width": 400, "height": 300 },
        "num_images": 5,
        "structuring_element": { "shape": "disk", "radius": 1 }
    }"#;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.background_color, 0);
        assert_eq!(config.foreground_color, 255);
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.shape_per_image, 3);
        assert_eq!(config.images_dir, PathBuf::from("images"));
        assert!(!config.save_outputs);
        assert_eq!(config.thread_counts[0], 1);
        assert_eq!(config.run_label().unwrap(), "400x300_disk1");
    }

    #[test]
    fn test_full_config() {
        let config = BenchConfig::from_json(
            r#"{
                "image_size": { "width": 64, "height": 64 },
                "num_images": 2,
                "background_color": 10,
                "foreground_color": 200,
                "structuring_element": { "shape": "square", "radius": 2 },
                "tile_size": 8,
                "shape_per_image": 1,
                "thread_counts": [1, 2],
                "seed": 42
            }"#,
        )
        .unwrap();
        assert_eq!(config.palette(), Palette::new(10, 200));
        assert_eq!(config.morph_config().tile_size, 8);
        assert_eq!(config.structuring_element().unwrap().offsets().len(), 25);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_invalid_shape_surfaces_at_setup() {
        let config = BenchConfig::from_json(
            &MINIMAL.replace("\"disk\"", "\"triangle\""),
        )
        .unwrap();
        assert!(matches!(
            config.structuring_element(),
            Err(MorphError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = BenchConfig::from_json(MINIMAL).unwrap();
        config.foreground_color = config.background_color;
        assert!(matches!(
            config.validate(),
            Err(MorphError::InvalidConfig {
                name: "foreground_color",
                ..
            })
        ));

        let mut config = BenchConfig::from_json(MINIMAL).unwrap();
        config.thread_counts = vec![1, 0];
        assert!(config.validate().is_err());

        assert!(matches!(
            BenchConfig::from_json("{ not json"),
            Err(MorphError::Config(_))
        ));
    }

    #[test]
    fn test_default_thread_counts() {
        let counts = default_thread_counts();
        assert_eq!(counts[0], 1);
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
    }
}
