//! Configuration and dependency wiring for the benchmark.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::BenchConfig;
