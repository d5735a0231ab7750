//! Mapping experiments over an oracle mapping.

pub mod runner;

pub use runner::run_experiment;
