//! CLI command implementations

pub mod achievements;
pub mod activity;
pub mod level;
pub mod metric;
