//! Configuration for one CLI run.
//!
//! Re-exports [`CliConfig`], [`RunOptions`] and config [`Error`].

mod cli_config;
mod run_options;

pub use cli_config::{CliConfig, Error};
pub use run_options::RunOptions;
