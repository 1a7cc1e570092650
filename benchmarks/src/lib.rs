//! Benchmarks for the Clotho callback library.
//!
//! The benchmark targets live under `benches/`; this crate only exists to
//! give them a package.
