//! Benchmark module
//! Timed submissions and latency statistics per method

pub mod runner;
pub mod stats;

pub use runner::BenchmarkRunner;
pub use stats::BenchmarkSeries;
