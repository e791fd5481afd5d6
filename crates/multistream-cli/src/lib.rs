#![forbid(unsafe_code)]

//! Command-line front end for the multistream layout engine.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{run, run_from_env};
pub use error::{CliError, Result};
