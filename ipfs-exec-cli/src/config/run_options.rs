//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Used by [`CliConfig::apply_options`](super::CliConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

use std::path::PathBuf;

/// Overrides for a run. Only set fields replace the env-based config.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Repository path; replaces `IPFS_PATH`.
    pub repo: Option<PathBuf>,
    /// Settle delay after `shutdown`, in milliseconds.
    pub shutdown_delay_ms: Option<u64>,
    /// Disable ready-line detection in daemon output.
    pub no_sentinel: bool,
    /// Succeed only when the command fails, printing its error.
    pub expect_fail: bool,
    /// Debug-level logs on stderr.
    pub verbose: bool,
}
