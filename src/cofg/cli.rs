//! CLI arguments
//!
//! `--ip`/`--port`/`--config` apply to every subcommand. `serve` is the default when no
//! subcommand is given; `smoke` runs the smoke suite.
//!
//! WHY: Allow quick overrides (ip/port) without editing the config file, and a CI step can run
//! `smoke` against a deployed URL with the same binary. Keep the surface small so it does not
//! drift from the file-based defaults.
//!
//! 中文：提供最小集合的命令列參數覆寫設定檔（IP/Port），並以 `smoke` 子命令讓 CI 直接
//! 對部署後的網址做冒煙測試。

use clap::{ Parser, Subcommand };
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version = crate::VERSION, about, long_about = None)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,
  #[command(flatten)]
  pub args: Args,
}

#[derive(clap::Args, Debug, Default, Clone, PartialEq)]
pub struct Args {
  #[arg(long, global = true)]
  pub ip: Option<String>,
  #[arg(long, global = true)]
  pub port: Option<u16>,
  /// config file layered over the built-in defaults
  #[arg(long, short = 'c', global = true, default_value = "./cofg.yaml")]
  pub config: PathBuf,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
  /// Serve the welcome page (default)
  Serve,
  /// Run the smoke suite and exit non-zero if any case fails
  Smoke(SmokeArgs),
}

#[derive(clap::Args, Debug, Default, Clone, PartialEq)]
pub struct SmokeArgs {
  /// base URL of a running server; when omitted a server is started on a free port
  #[arg(long)]
  pub target: Option<String>,
  /// overrides `probe.timeout_ms`; must be at least 1
  #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
  pub timeout_ms: Option<u64>,
  /// print the report as JSON
  #[arg(long)]
  pub json: bool,
}
