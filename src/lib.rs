//! Library crate for portsweep: a single-host TCP connect scanner driven by
//! a bounded worker pool.
pub mod config;
pub mod error;
pub mod output;
pub mod ports;
pub mod probe;
pub mod progress;
pub mod queue;
pub mod scanner;
pub mod types;
