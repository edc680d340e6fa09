use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use conflint::config::DEFAULT_CONFIG_FILE;
use conflint::runner::{Runner, DEFAULT_DELIMITER, DEFAULT_ERRORFORMAT};

/// conflint - Run various configuration linters and print aggregated results for CI
#[derive(Parser)]
#[command(name = "conflint")]
#[command(version)]
#[command(about = "Run various configuration linters and print aggregated results for CI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs linters against certain files and print results as configured
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file to be loaded
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// errorformat-style output format. Specify the same format to reviewdog for integration
    #[arg(short = 'e', long = "efm", default_value = DEFAULT_ERRORFORMAT)]
    efm: String,

    /// Delimiter between the jsonpath part and the message part. For a linter error
    /// `apiVersion| apiVersion must be apps/v1` and `-d '| '`, `$.apiVersion` is the
    /// jsonpath part and `apiVersion must be apps/v1` the message part
    #[arg(short = 'd', long = "delim", default_value = DEFAULT_DELIMITER)]
    delim: String,
}

fn main() -> Result<()> {
    // CONFLINT_LOG=debug shows linter invocations and per-document lookups
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("CONFLINT_LOG", "warn"))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let work_dir = std::env::current_dir().context("Failed to determine working directory")?;

    let stdout = io::stdout();
    let mut runner = Runner::new(stdout.lock(), work_dir);
    runner.config_file = args.config;
    runner.errformat = args.efm;
    runner.delim = args.delim;

    let found = runner.run()?;
    if found > 0 {
        let word = if found > 1 { "errors" } else { "error" };
        bail!("found {} linter {}", found, word);
    }

    Ok(())
}
