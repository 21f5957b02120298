use std::{fs::File, path::PathBuf};

use account_ledger::{
    bin_utils::{ScriptError, Service},
    config::{DEFAULT_INTEREST_RATE, LedgerConfig},
};
use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

/// Replays a ledger script and prints the outcome of every command.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// CSV script with `op,account,amount,target,name` columns
    script: PathBuf,
    /// Rate applied by the `interest` command
    #[arg(long, default_value_t = DEFAULT_INTEREST_RATE)]
    interest_rate: Decimal,
    /// Print a CSV summary of all accounts at the end
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let file = File::open(&args.script)
        .with_context(|| format!("Failed to open `{}`", args.script.display()))?;
    let config = LedgerConfig::new(args.interest_rate).context("Invalid ledger configuration")?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config,
        summary: args.summary,
        error_printer: Box::new(|line, err| match err {
            ScriptError::Parse(err) => eprintln!("Error at line {line}: {err}"),
            ScriptError::Ledger(err) => eprintln!("Error at line {line}: {err}"),
        }),
    };
    service.run()
}
