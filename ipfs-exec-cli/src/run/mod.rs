//! Run entry points: run with env config, run_with_config, or run_with_options.

pub use crate::config::Error;

use crate::config::{CliConfig, RunOptions};

/// Run `command` with config from `.env` and env vars.
pub async fn run(command: &str) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let config = CliConfig::from_env()?;
    run_with_config(&config, command).await
}

/// Run `command` with env config plus `options` (e.g. parsed CLI flags).
pub async fn run_with_options(command: &str, options: &RunOptions) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let mut config = CliConfig::from_env()?;
    config.apply_options(options);
    run_with_config(&config, command).await
}

/// Run `command` on a fresh harness built from `config`.
///
/// With `expect_fail` the result is the failure's message, and a successful
/// command is an error.
pub async fn run_with_config(config: &CliConfig, command: &str) -> Result<String, Error> {
    let harness = config.harness();
    tracing::debug!(
        repo = %harness.repo_path().display(),
        expect_fail = config.expect_fail,
        command = command,
        "running command"
    );
    let output = if config.expect_fail {
        harness.fail(command).await?
    } else {
        harness.execute(command).await?
    };
    Ok(output)
}
