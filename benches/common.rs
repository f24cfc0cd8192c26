use morph_bench::utils::synthetic::SyntheticGenerator;
use morph_bench::{BinaryImage, Palette};

pub fn synthetic_batch(width: usize, height: usize, count: usize) -> Vec<BinaryImage> {
    SyntheticGenerator::new(width, height, Palette::default(), 3, Some(2024))
        .generate(count)
        .expect("synthetic batch")
}

#[allow(dead_code)]
pub fn thread_counts() -> Vec<usize> {
    let max = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    [1, 2, 4, 8].into_iter().filter(|&t| t <= max).collect()
}
