//! Real-world scenario benchmarks.
//!
//! These render complete blocks through the engine, from a single held note
//! to a full pool with voices being stolen every block.

mod voices;

pub use voices::{bench_stealing, bench_voices};
