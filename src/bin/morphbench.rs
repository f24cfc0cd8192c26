use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use morph_bench::morphology::{Engine, ExecutionMode, Operator, Strategy};
use morph_bench::pipeline::{prepare_batch, run_benchmark};
use morph_bench::tools::{binary_stats, load_binary, save_binary};
use morph_bench::utils::config::BenchConfig;
use morph_bench::{MorphConfig, Palette, Shape, StructuringElement};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "morphbench", version, about = "Binary morphology benchmark")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full benchmark described by a config file
    Run {
        #[arg(long, default_value = "settings/config.json")]
        config: PathBuf,
    },
    /// Only generate the synthetic batch
    Generate {
        #[arg(long, default_value = "settings/config.json")]
        config: PathBuf,
    },
    /// Apply one operator to a single image
    Apply {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// erode, dilate, open or close
        #[arg(long, default_value = "erode")]
        op: String,
        /// naive, offset-list or tiled
        #[arg(long, default_value = "offset-list")]
        strategy: String,
        #[arg(long, default_value = "disk")]
        shape: String,
        #[arg(long, default_value_t = 1)]
        radius: usize,
        /// Worker threads; 0 runs sequentially
        #[arg(long, default_value_t = 0)]
        threads: usize,
        #[arg(long, default_value_t = 32)]
        tile_size: usize,
    },
    /// Print a structuring element and save its preview image
    Element {
        #[arg(long, default_value = "disk")]
        shape: String,
        #[arg(long, default_value_t = 1)]
        radius: usize,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Run { config } => run_cmd(&config),
        Command::Generate { config } => generate_cmd(&config),
        Command::Apply {
            input,
            output,
            op,
            strategy,
            shape,
            radius,
            threads,
            tile_size,
        } => apply_cmd(
            &input, &output, &op, &strategy, &shape, radius, threads, tile_size,
        ),
        Command::Element {
            shape,
            radius,
            output,
        } => element_cmd(&shape, radius, output.as_deref()),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn load_config(path: &Path) -> Result<BenchConfig> {
    BenchConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn run_cmd(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let start = Instant::now();
    let summary = run_benchmark(&config).context("Benchmark failed")?;

    println!(
        "Benchmark {} on {} images finished in {:.1}s",
        summary.label,
        summary.images,
        start.elapsed().as_secs_f64()
    );
    for (report, files) in summary.reports.iter().zip(&summary.files) {
        let best = report
            .speedups()
            .into_iter()
            .map(|row| (row.threads, row.times[0].mean))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        println!(
            "  {} ({}): best erosion speedup {:.2}x at {} threads -> {}",
            report.strategy.label(),
            report.strategy,
            best.1,
            best.0,
            files.speedup_csv.display()
        );
    }
    Ok(())
}

fn generate_cmd(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let images = prepare_batch(&config).context("Failed to generate images")?;
    let palette = config.palette();
    let foreground: usize = images
        .iter()
        .map(|image| binary_stats(image, &palette).foreground_pixels)
        .sum();
    let total: usize = images.iter().map(|i| i.width() * i.height()).sum();
    println!(
        "Generated {} images in {} ({:.2}% foreground)",
        images.len(),
        config.images_dir.join("basis").display(),
        100.0 * foreground as f64 / total.max(1) as f64
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn apply_cmd(
    input: &Path,
    output: &Path,
    op: &str,
    strategy: &str,
    shape: &str,
    radius: usize,
    threads: usize,
    tile_size: usize,
) -> Result<()> {
    let operator: Operator = op.parse().map_err(|e: String| anyhow!(e))?;
    let strategy: Strategy = strategy.parse().map_err(|e: String| anyhow!(e))?;
    let se = StructuringElement::build(shape.parse::<Shape>()?, radius);
    let palette = Palette::default();
    let engine = Engine::new(MorphConfig { palette, tile_size })?;
    let mode = if threads == 0 {
        ExecutionMode::Sequential
    } else {
        ExecutionMode::Parallel { threads }
    };

    let image = load_binary(input, &palette)
        .with_context(|| format!("Failed to load image {}", input.display()))?;
    info!(
        "Image: {} ({}x{})",
        input.display(),
        image.width(),
        image.height()
    );

    let start = Instant::now();
    let result = engine.apply(operator, &image, &se, strategy, mode)?;
    let elapsed = start.elapsed();

    save_binary(&result, output)?;
    let before = binary_stats(&image, &palette);
    let after = binary_stats(&result, &palette);
    println!(
        "{} ({}, {:?}) in {:.3} ms: foreground {} -> {} pixels, saved {}",
        operator,
        strategy,
        mode,
        elapsed.as_secs_f64() * 1000.0,
        before.foreground_pixels,
        after.foreground_pixels,
        output.display()
    );
    Ok(())
}

fn element_cmd(shape: &str, radius: usize, output: Option<&Path>) -> Result<()> {
    let se = StructuringElement::build(shape.parse::<Shape>()?, radius);
    println!(
        "Structuring element {} r={} ({}x{}, {} active cells):",
        shape,
        radius,
        se.width(),
        se.height(),
        se.offsets().len()
    );
    print!("{}", se);

    if let Some(path) = output {
        save_binary(&se.to_image(&Palette::default())?, path)?;
        println!("Saved preview to {}", path.display());
    }
    Ok(())
}
