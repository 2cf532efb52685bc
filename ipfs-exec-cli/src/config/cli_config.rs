//! Run config: repo path, shutdown delay, daemon API address, sentinel detection.
//! Filled from env / .env, then overlaid with [`RunOptions`](super::RunOptions).

use std::path::PathBuf;
use std::time::Duration;

use ipfs_exec::backend::repo_path_from_env;
use ipfs_exec::{Harness, HarnessConfig, DAEMON_API_ADDR, SHUTDOWN_SETTLE_DELAY};

/// Error type used for config loading and runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Settings for one CLI run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    /// Repository the harness binds `IPFS_PATH` to.
    pub repo_path: PathBuf,
    /// Delay after `shutdown` before the output resolves.
    pub shutdown_delay: Duration,
    /// API multiaddr for `daemon`.
    pub api_addr: String,
    /// Treat the daemon's ready line as completion.
    pub sentinel_detection: bool,
    /// Run through [`Harness::fail`] instead of [`Harness::execute`].
    pub expect_fail: bool,
    /// Debug logs. Set by `--verbose`.
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        let harness = HarnessConfig::default();
        Self {
            repo_path: repo_path_from_env(),
            shutdown_delay: harness.shutdown_delay,
            api_addr: harness.daemon_api_addr,
            sentinel_detection: harness.sentinel_detection,
            expect_fail: false,
            verbose: false,
        }
    }
}

impl CliConfig {
    /// Fill config from env vars. Call `dotenv::dotenv().ok()` first to pick up `.env`.
    ///
    /// `IPFS_PATH` (default `.ipfs-exec`), `IPFS_EXEC_SHUTDOWN_DELAY_MS` (default 1000),
    /// `IPFS_EXEC_API_ADDR` (default `/ip4/127.0.0.1/tcp/5002`) and
    /// `IPFS_EXEC_SENTINEL` (`0`, `false`, `off` disable it) are all optional.
    pub fn from_env() -> Result<Self, Error> {
        let repo_path = repo_path_from_env();
        let shutdown_delay = match std::env::var("IPFS_EXEC_SHUTDOWN_DELAY_MS") {
            Ok(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("IPFS_EXEC_SHUTDOWN_DELAY_MS must be milliseconds, got {raw:?}"),
                    )
                })?;
                Duration::from_millis(ms)
            }
            Err(_) => SHUTDOWN_SETTLE_DELAY,
        };
        let api_addr =
            std::env::var("IPFS_EXEC_API_ADDR").unwrap_or_else(|_| DAEMON_API_ADDR.to_string());
        let sentinel_detection = std::env::var("IPFS_EXEC_SENTINEL")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"))
            .unwrap_or(true);
        Ok(Self {
            repo_path,
            shutdown_delay,
            api_addr,
            sentinel_detection,
            expect_fail: false,
            verbose: false,
        })
    }

    /// Apply overrides from `RunOptions`; only set fields replace values.
    pub fn apply_options(&mut self, options: &super::RunOptions) {
        if let Some(repo) = &options.repo {
            self.repo_path = repo.clone();
        }
        if let Some(ms) = options.shutdown_delay_ms {
            self.shutdown_delay = Duration::from_millis(ms);
        }
        if options.no_sentinel {
            self.sentinel_detection = false;
        }
        self.expect_fail = options.expect_fail;
        self.verbose = options.verbose;
    }

    /// Library-side settings for the harness.
    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            shutdown_delay: self.shutdown_delay,
            daemon_api_addr: self.api_addr.clone(),
            sentinel_detection: self.sentinel_detection,
        }
    }

    /// Harness bound to this config's repo with the built-in commands and memory backend.
    pub fn harness(&self) -> Harness {
        Harness::new(self.repo_path.clone()).with_config(self.harness_config())
    }
}
