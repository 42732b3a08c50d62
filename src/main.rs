//! vmresolve CLI. Decides what a VM or scale-set deployment reuses and what it creates.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "VMRESOLVE_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "vmresolve",
    version,
    about = "Resolve VM and scale-set create parameters against existing infrastructure"
)]
struct Cli {
    /// Log every resolution step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: vmresolve::cli::Commands,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("vmresolve=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = vmresolve::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(e.code);
    }
}
