//! ipfs-exec-cli library: run one harness command from env config plus overrides.
//!
//! Reads `.env` and `IPFS_EXEC_*` variables, builds a [`Harness`](ipfs_exec::Harness),
//! runs the command (or expects it to fail) and returns its captured output.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), ipfs_exec_cli::Error> {
//! let out = ipfs_exec_cli::run("version").await?;
//! print!("{out}");
//! # Ok(())
//! # }
//! ```

mod config;
mod logging;
mod run;

pub use config::{CliConfig, Error, RunOptions};
pub use logging::init_tracing;
pub use run::{run, run_with_config, run_with_options};
