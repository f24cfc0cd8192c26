//! Benchmark driver
//!
//! Generates a synthetic batch, runs every strategy sequentially and then in
//! parallel for each configured thread count, and writes timing reports.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{MorphError, Result};
use crate::models::{BinaryImage, StructuringElement};
use crate::morphology::{BatchSchedule, Engine, ExecutionMode, Operator, Strategy, check_fit};
use crate::tools::report::{ReportFiles, StrategyReport, Timing, TimingRow};
use crate::tools::{create_dirs, load_batch, save_batch, save_binary, save_outputs};
use crate::utils::config::BenchConfig;
use crate::utils::synthetic::SyntheticGenerator;

/// Outcome of a benchmark run
#[derive(Debug, Clone)]
pub struct BenchSummary {
    /// Run label, e.g. `400x400_disk1`
    pub label: String,
    /// Number of images actually benchmarked
    pub images: usize,
    /// Directory holding the reports
    pub results_dir: PathBuf,
    /// One report per strategy, in [`Strategy::ALL`] order
    pub reports: Vec<StrategyReport>,
    /// Files written for each report
    pub files: Vec<ReportFiles>,
}

/// Generate the synthetic batch, write it to `images_dir/basis` and read it back
pub fn prepare_batch(config: &BenchConfig) -> Result<Vec<BinaryImage>> {
    let palette = config.palette();
    let mut generator = SyntheticGenerator::new(
        config.image_size.width,
        config.image_size.height,
        palette,
        config.shape_per_image,
        config.seed,
    );
    let generated = generator.generate(config.num_images)?;

    let basis = config.images_dir.join("basis");
    save_batch(&generated, &basis)?;
    info!(
        "{} images {}x{} generated in {}",
        generated.len(),
        config.image_size.width,
        config.image_size.height,
        basis.display()
    );

    let images = load_batch(&basis, config.num_images, &palette);
    info!("Total images loaded: {}", images.len());
    if images.is_empty() {
        return Err(MorphError::InvalidConfig {
            name: "images_dir",
            reason: format!("no images could be loaded from {}", basis.display()),
        });
    }
    Ok(images)
}

/// Time all four operators for one strategy and mode.
///
/// `mean` is the average of per-image calls (pixel-level parallelism in
/// parallel mode); `total` is one batch call with whole images in parallel.
/// The worker pool is resolved once per operator, outside the timed calls.
pub fn time_strategy(
    engine: &Engine,
    images: &[BinaryImage],
    se: &StructuringElement,
    strategy: Strategy,
    mode: ExecutionMode,
) -> Result<[Timing; 4]> {
    for image in images {
        check_fit(image, se)?;
    }

    let mut timings = [Timing::default(); 4];
    for (slot, op) in timings.iter_mut().zip(Operator::ALL) {
        let elapsed = engine.with_mode(mode, |exec| -> Result<f64> {
            let mut elapsed = 0.0;
            for image in images {
                let start = Instant::now();
                engine.apply_with(op, image, se, strategy, exec)?;
                elapsed += start.elapsed().as_secs_f64();
            }
            Ok(elapsed)
        })??;
        slot.mean = elapsed / images.len().max(1) as f64;

        let start = Instant::now();
        engine.apply_to_batch(images, se, op, strategy, mode, BatchSchedule::Images)?;
        slot.total = start.elapsed().as_secs_f64();

        debug!(
            "{} {} {:?}: mean {:.6}s total {:.6}s",
            strategy, op, mode, slot.mean, slot.total
        );
    }
    Ok(timings)
}

/// Run the whole benchmark described by `config`
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchSummary> {
    config.validate()?;
    // Fail on a bad shape before generating anything
    config.structuring_element()?;
    let images = prepare_batch(config)?;
    run_on_batch(config, &images)
}

/// Run the benchmark on an already loaded batch
pub fn run_on_batch(config: &BenchConfig, images: &[BinaryImage]) -> Result<BenchSummary> {
    let se = config.structuring_element()?;
    let label = config.run_label()?;
    let engine = Engine::new(config.morph_config())?;
    let palette = config.palette();

    let results_dir = config.results_dir.join(&label);
    create_dirs(&results_dir)?;
    save_binary(&se.to_image(&palette)?, results_dir.join("se.png"))?;
    info!("Structuring element ({}):\n{}", label, se);

    if config.save_outputs {
        for op in Operator::ALL {
            let outputs = engine.apply_to_batch(
                images,
                &se,
                op,
                Strategy::OffsetList,
                ExecutionMode::Sequential,
                BatchSchedule::Pixels,
            )?;
            save_outputs(outputs.values(), config.images_dir.join(op.name()))?;
        }
        info!("Operator outputs saved under {}", config.images_dir.display());
    }

    let mut reports = Vec::with_capacity(Strategy::ALL.len());
    let mut files = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        info!("{} ({}): sequential baseline", strategy.label(), strategy);
        let sequential = time_strategy(&engine, images, &se, strategy, ExecutionMode::Sequential)?;
        let mut report = StrategyReport::new(strategy, sequential);

        for &threads in &config.thread_counts {
            engine.warm_up(threads)?;
            let times = time_strategy(
                &engine,
                images,
                &se,
                strategy,
                ExecutionMode::Parallel { threads },
            )?;
            report.parallel.push(TimingRow { threads, times });
            info!("{} ({}): {} threads done", strategy.label(), strategy, threads);
        }

        files.push(report.write_all(&results_dir, &label)?);
        reports.push(report);
    }

    info!("Reports written to {}", results_dir.display());
    Ok(BenchSummary {
        label,
        images: images.len(),
        results_dir,
        reports,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shape;

    fn images() -> Vec<BinaryImage> {
        (1..=3)
            .map(|i| {
                let mut image = BinaryImage::new(16, 12, 0).unwrap();
                for x in 2..10 {
                    image.set(x, i + 2, 255);
                }
                image.with_source(format!("image_{}.jpg", i))
            })
            .collect()
    }

    #[test]
    fn test_time_strategy_in_both_modes() {
        let engine = Engine::default();
        let se = StructuringElement::build(Shape::Disk, 1);
        let images = images();

        for mode in [
            ExecutionMode::Sequential,
            ExecutionMode::Parallel { threads: 2 },
        ] {
            let timings = time_strategy(&engine, &images, &se, Strategy::Tiled, mode).unwrap();
            for t in timings {
                assert!(t.mean >= 0.0 && t.mean.is_finite());
                assert!(t.total >= 0.0 && t.total.is_finite());
            }
        }
    }

    #[test]
    fn test_time_strategy_rejects_bad_inputs() {
        let engine = Engine::default();
        let images = images();

        let too_big = StructuringElement::build(Shape::Square, 8);
        assert!(matches!(
            time_strategy(&engine, &images, &too_big, Strategy::Naive, ExecutionMode::Sequential),
            Err(MorphError::DimensionMismatch { .. })
        ));

        let se = StructuringElement::build(Shape::Square, 1);
        assert!(matches!(
            time_strategy(
                &engine,
                &images,
                &se,
                Strategy::Naive,
                ExecutionMode::Parallel { threads: 0 }
            ),
            Err(MorphError::InvalidThreadCount)
        ));
    }
}
