//! Core library components.
//!
//! Everything that does not print: configuration, the Azure seam, step
//! orchestration and the files the bootstrap writes.

pub mod azure;
pub mod bootstrap;
pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod fs;
pub mod retry;
pub mod validation;
pub mod variables;
