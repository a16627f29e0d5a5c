//! Benchmarks for the spindle runtime live under `benches/`.
