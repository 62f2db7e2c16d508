//! Facade over `vib-cargo-core` for consumers that only need the entry points

pub use vib_cargo_core::*;
