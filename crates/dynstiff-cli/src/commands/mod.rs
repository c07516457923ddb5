//! CLI command implementations.

pub mod analyze;
mod common;
pub mod generate;
pub mod profile;
pub mod waterfall;
