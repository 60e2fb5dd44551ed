//! osu-score - apply osu! mods and estimate star rating / pp
//!
//! Usage:
//!   osu-score apply --ar 9 --cs 4 --od 8 --hp 5 HT DA:cs=5
//!   osu-score estimate score.json [--accuracy-mode]
//!   osu-score config [--init]
//!
//! Add `--json` to any command for machine readable output.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod mod_arg;
mod score_file;

const DEFAULT_LOG_DIRECTIVES: &str = "osu_score=info,osu_score_core=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();
    cli::run(args).await
}

fn init_logging() {
    // stdout is reserved for command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
