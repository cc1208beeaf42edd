use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

/// Practice math exercises in the terminal.
#[derive(Parser, Debug)]
#[command(name = "mathplay", version, about)]
pub struct Args {
    /// Catalog JSON file; the bundled exercises are used when omitted.
    #[arg(long, env = "MATHPLAY_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Exercise id to open; defaults to the first exercise of the catalog.
    #[arg(long, env = "MATHPLAY_EXERCISE")]
    pub exercise: Option<String>,

    /// Seed for the challenge order, for reproducible sessions.
    #[arg(long, env = "MATHPLAY_SEED")]
    pub seed: Option<u64>,

    /// List the catalog's exercises and exit.
    #[arg(long)]
    pub list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides `verbosity`.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}
