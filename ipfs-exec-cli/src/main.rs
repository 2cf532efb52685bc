//! `ipfs-exec` binary: run one command in-process and print what it wrote.

use std::path::PathBuf;

use clap::Parser;
use ipfs_exec_cli::{init_tracing, run_with_options, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "ipfs-exec")]
#[command(about = "Run a CLI command in-process against a backend node and print its output")]
struct Args {
    /// Repository path (overrides IPFS_PATH)
    #[arg(long, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Succeed only if the command fails; print its error
    #[arg(long)]
    expect_fail: bool,

    /// Settle delay after `shutdown`, in milliseconds
    #[arg(long, value_name = "N")]
    shutdown_delay_ms: Option<u64>,

    /// Do not treat the daemon ready line as completion
    #[arg(long)]
    no_sentinel: bool,

    /// Debug logs on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Command and its arguments, e.g. `files cat <hash>`
    #[arg(trailing_var_arg = true, required = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Args {
    fn options(&self) -> RunOptions {
        RunOptions {
            repo: self.repo.clone(),
            shutdown_delay_ms: self.shutdown_delay_ms,
            no_sentinel: self.no_sentinel,
            expect_fail: self.expect_fail,
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let request = args.command.join(" ");
    match run_with_options(&request, &args.options()).await {
        Ok(output) if output.ends_with('\n') || output.is_empty() => print!("{}", output),
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
