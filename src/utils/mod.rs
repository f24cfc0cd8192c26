//! Supporting utilities for the benchmark
//!
//! - Configuration (JSON settings for a benchmark run)
//! - Synthetic image generation (random rectangles, circles, rings, lines)

pub mod config;
pub mod synthetic;
