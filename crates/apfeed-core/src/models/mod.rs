//! Data models: run configuration and the invoice accumulator.

pub mod config;
pub mod invoice;
