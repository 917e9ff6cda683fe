//! CLI module for the deployment update planner.
//!
//! This module provides the command-line interface for computing and
//! inspecting update plans.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
