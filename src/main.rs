use clap::Parser;
use env_seed::env::EnvTarget;
use env_seed::load::{EnvLoad, EnvLoadOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(
  name = "env-seed",
  about = "Seed your environment from .env files with predictable override rules",
  version,
  author
)]
struct Cli {
  /// Path to an env file. Repeat for multiple files; later files win
  #[arg(short, long = "file")]
  files: Vec<PathBuf>,

  /// Overwrite variables that are already set in the environment
  #[arg(short, long = "override")]
  override_existing: bool,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Command to run with the loaded environment; prints the parsed
  /// variables when omitted
  #[arg(trailing_var_arg = true)]
  command: Vec<String>,
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    1 => "debug",
    2 => "trace",
    _ => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer())
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  let options = EnvLoadOptions {
    paths: cli.files,
    override_existing: cli.override_existing,
  };

  // Loading into a snapshot keeps the binary free of process-environment
  // mutation; the child command receives the merged result instead.
  let mut target = EnvTarget::from_memory(snapshot_process_env());
  let result = EnvLoad::load_into(&mut target, &options)?;

  if let Some((program, args)) = cli.command.split_first() {
    let merged = target.into_memory().unwrap_or_default();
    let status = Command::new(program).args(args).envs(&merged).status()?;
    std::process::exit(status.code().unwrap_or(1));
  }

  for (key, value) in &result.parsed {
    println!("{key}={value}");
  }

  Ok(())
}

fn snapshot_process_env() -> BTreeMap<String, String> {
  std::env::vars().collect()
}
