//! Relay code coverage from a CI job to hosted coverage services.

pub mod cli;
pub mod context;
pub mod coverage;
pub mod diffcover;
pub mod pipeline;
pub mod platform;
pub mod report;
pub mod types;
pub mod upload;
pub mod utils;

pub use types::*;
