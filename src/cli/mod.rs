//! CLI layer: argument parsing, command dispatch and report rendering

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod report;

pub use args::{Cli, Commands};
pub use error::{CliError, CliResult};
