//! Binary morphology engine
//!
//! Erosion and dilation are computed with a per-pixel hit test over the
//! structuring element's active cells; opening and closing are compositions
//! of the two. Every operator is available through three strategies that
//! differ only in iteration order:
//! - [`Strategy::Naive`]: scan all kernel cells, test activity inline
//! - [`Strategy::OffsetList`]: iterate the precomputed active offsets
//! - [`Strategy::Tiled`]: offset-list iteration over square pixel tiles
//!
//! Boundary policy is clamp: neighbours outside the image are skipped and
//! never count as a hit, so every pixel of the output is computed.

mod batch;
mod naive;
mod offset_list;
mod parallel;
mod tiled;

pub use batch::BatchSchedule;

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::{MorphError, Result};
use crate::models::image::alloc_filled;
use crate::models::{BinaryImage, Palette, StructuringElement};

use naive::NaiveKernel;
use offset_list::OffsetListKernel;
pub(crate) use parallel::Exec;
use parallel::PoolCache;
use tiled::TiledKernel;

/// Morphological operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Shrink foreground
    Erode,
    /// Grow foreground
    Dilate,
    /// Erosion followed by dilation
    Open,
    /// Dilation followed by erosion
    Close,
}

impl Operator {
    /// All operators, in report column order
    pub const ALL: [Operator; 4] = [
        Operator::Erode,
        Operator::Dilate,
        Operator::Open,
        Operator::Close,
    ];

    /// Single-letter tag used in report columns
    pub fn letter(&self) -> char {
        match self {
            Operator::Erode => 'E',
            Operator::Dilate => 'D',
            Operator::Open => 'O',
            Operator::Close => 'C',
        }
    }

    /// Lowercase operator name
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Erode => "erosion",
            Operator::Dilate => "dilation",
            Operator::Open => "opening",
            Operator::Close => "closing",
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "erode" | "erosion" | "e" => Ok(Operator::Erode),
            "dilate" | "dilation" | "d" => Ok(Operator::Dilate),
            "open" | "opening" | "o" => Ok(Operator::Open),
            "close" | "closing" | "c" => Ok(Operator::Close),
            _ => Err(format!("unknown operator: {}", s)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iteration strategy for erosion/dilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Full kernel scan per pixel
    Naive,
    /// Active-offset list per pixel
    OffsetList,
    /// Active-offset list over square tiles
    Tiled,
}

impl Strategy {
    /// All strategies, in benchmark order
    pub const ALL: [Strategy; 3] = [Strategy::Naive, Strategy::OffsetList, Strategy::Tiled];

    /// Version tag used in report file names
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Naive => "V1",
            Strategy::OffsetList => "V2",
            Strategy::Tiled => "V3",
        }
    }

    /// Lowercase strategy name
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::OffsetList => "offset-list",
            Strategy::Tiled => "tiled",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" | "v1" => Ok(Strategy::Naive),
            "offset-list" | "offset_list" | "offsets" | "v2" => Ok(Strategy::OffsetList),
            "tiled" | "v3" => Ok(Strategy::Tiled),
            _ => Err(format!("unknown strategy: {}", s)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the pixel loop is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Single thread, caller's thread
    Sequential,
    /// Fork-join over a pool of `threads` workers
    Parallel {
        /// Worker count (>= 1)
        threads: usize,
    },
}

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphConfig {
    /// Background/foreground values
    pub palette: Palette,
    /// Tile edge length for [`Strategy::Tiled`]
    pub tile_size: usize,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            tile_size: 32,
        }
    }
}

/// Hit test of a basic operator: output `target` if any active neighbour
/// equals `target`, otherwise `other`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Probe {
    pub target: u8,
    pub other: u8,
}

impl Probe {
    fn erosion(palette: &Palette) -> Self {
        Self {
            target: palette.background,
            other: palette.foreground,
        }
    }

    fn dilation(palette: &Palette) -> Self {
        Self {
            target: palette.foreground,
            other: palette.background,
        }
    }

    #[inline]
    pub fn resolve(&self, hit: bool) -> u8 {
        if hit { self.target } else { self.other }
    }
}

/// Fills a horizontal band of output rows.
///
/// Bands are the unit of parallel work, so a kernel must only write inside
/// the slice it is handed.
pub(crate) trait BandKernel: Sync {
    /// Rows per parallel band
    fn band_rows(&self) -> usize;

    /// Compute rows `first_row..first_row + band.len() / width`
    fn fill_band(&self, src: &BinaryImage, probe: Probe, first_row: usize, band: &mut [u8]);
}

/// Morphology engine with explicit configuration and cached worker pools
pub struct Engine {
    config: MorphConfig,
    pools: PoolCache,
}

impl Engine {
    /// Create an engine
    pub fn new(config: MorphConfig) -> Result<Self> {
        if config.tile_size == 0 {
            return Err(MorphError::InvalidTileSize);
        }
        Ok(Self {
            config,
            pools: PoolCache::new(),
        })
    }

    /// Engine settings
    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    /// Build the worker pool for `threads` ahead of time
    pub fn warm_up(&self, threads: usize) -> Result<()> {
        self.pools.get(threads).map(|_| ())
    }

    /// Apply `operator` to one image.
    ///
    /// Returns a newly allocated image of the same size; the input is not
    /// modified. Sequential and parallel modes produce identical output.
    pub fn apply(
        &self,
        operator: Operator,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        mode: ExecutionMode,
    ) -> Result<BinaryImage> {
        check_fit(image, se)?;
        self.with_mode(mode, |exec| {
            self.apply_with(operator, image, se, strategy, exec)
        })?
    }

    /// Run `f` in the context of `mode`, resolving the worker pool once.
    ///
    /// Parallel mode installs the pool for the whole closure, so repeated
    /// [`Engine::apply_with`] calls inside it skip the pool lookup.
    pub(crate) fn with_mode<R, F>(&self, mode: ExecutionMode, f: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(Exec) -> R + Send,
    {
        match mode {
            ExecutionMode::Sequential => Ok(f(Exec::Sequential)),
            ExecutionMode::Parallel { threads } => {
                let pool = self.pools.get(threads)?;
                Ok(pool.install(|| f(Exec::Parallel)))
            }
        }
    }

    /// Erode with the given strategy and mode
    pub fn erode(
        &self,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        mode: ExecutionMode,
    ) -> Result<BinaryImage> {
        self.apply(Operator::Erode, image, se, strategy, mode)
    }

    /// Dilate with the given strategy and mode
    pub fn dilate(
        &self,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        mode: ExecutionMode,
    ) -> Result<BinaryImage> {
        self.apply(Operator::Dilate, image, se, strategy, mode)
    }

    /// Open (erode, then dilate)
    pub fn open(
        &self,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        mode: ExecutionMode,
    ) -> Result<BinaryImage> {
        self.apply(Operator::Open, image, se, strategy, mode)
    }

    /// Close (dilate, then erode)
    pub fn close(
        &self,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        mode: ExecutionMode,
    ) -> Result<BinaryImage> {
        self.apply(Operator::Close, image, se, strategy, mode)
    }

    /// Dispatch inside the current execution context (no pool install)
    pub(crate) fn apply_with(
        &self,
        operator: Operator,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        exec: Exec,
    ) -> Result<BinaryImage> {
        let palette = &self.config.palette;
        let erosion = Probe::erosion(palette);
        let dilation = Probe::dilation(palette);

        match operator {
            Operator::Erode => self.basic(erosion, image, se, strategy, exec),
            Operator::Dilate => self.basic(dilation, image, se, strategy, exec),
            Operator::Open => {
                let eroded = self.basic(erosion, image, se, strategy, exec)?;
                self.basic(dilation, &eroded, se, strategy, exec)
            }
            Operator::Close => {
                let dilated = self.basic(dilation, image, se, strategy, exec)?;
                self.basic(erosion, &dilated, se, strategy, exec)
            }
        }
    }

    fn basic(
        &self,
        probe: Probe,
        image: &BinaryImage,
        se: &StructuringElement,
        strategy: Strategy,
        exec: Exec,
    ) -> Result<BinaryImage> {
        let (width, height) = (image.width(), image.height());
        let mut out = alloc_filled(width * height, self.config.palette.background)?;

        trace!(
            "{} {}x{} target={} strategy={} exec={:?}",
            if probe.target == self.config.palette.background {
                "erode"
            } else {
                "dilate"
            },
            width,
            height,
            probe.target,
            strategy,
            exec
        );

        match strategy {
            Strategy::Naive => parallel::run(&NaiveKernel::new(se), image, probe, &mut out, exec),
            Strategy::OffsetList => parallel::run(
                &OffsetListKernel::new(se, width, height),
                image,
                probe,
                &mut out,
                exec,
            ),
            Strategy::Tiled => parallel::run(
                &TiledKernel::new(se, width, height, self.config.tile_size),
                image,
                probe,
                &mut out,
                exec,
            ),
        }

        Ok(BinaryImage::from_raw(width, height, out)?.with_source(image.source()))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            config: MorphConfig::default(),
            pools: PoolCache::new(),
        }
    }
}

/// Reject elements that do not fit inside the image
pub(crate) fn check_fit(image: &BinaryImage, se: &StructuringElement) -> Result<()> {
    if se.width() > image.width() || se.height() > image.height() {
        return Err(MorphError::DimensionMismatch {
            width: image.width(),
            height: image.height(),
            se_width: se.width(),
            se_height: se.height(),
        });
    }
    Ok(())
}
