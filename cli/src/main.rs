mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{analyze, apportion, sheets};
use tracing_subscriber::EnvFilter;

/// Log to stderr; `-v` enables info, `-vv` debug. `RUST_LOG` takes precedence.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nimbyvote={level},nimbyvote_cli={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Apportion(args) => apportion::run(&cli, args),
        Commands::Analyze(args) => analyze::run(&cli, args),
        Commands::Sheets(args) => sheets::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
