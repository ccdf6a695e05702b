//! CLI command implementations.

pub mod circuit;
pub mod common;
pub mod distance_range;
pub mod extra_qubits;
pub mod num_superposed;
