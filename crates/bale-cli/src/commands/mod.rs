//! Command implementations for the bale CLI.
//!
//! - [`build`] - build every planned bundle, optionally watching for changes
//! - [`plan`] - print the planned bundles
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod build;
pub mod plan;
pub(crate) mod report;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use plan::execute as plan_execute;
