//! Configuration loading and CLI precedence
//!
//! Order: built-in `cofg.yaml` → file from `--config` → CLI flags.
//!
//! 中文：設定優先序為 內建 `cofg.yaml` → `--config` 指定的檔案 → 命令列參數。

pub mod cli;
pub mod config;

pub use self::config::{ Cofg, CofgAddrs };

/// Merge CLI overrides into loaded config.
///
/// WHY: Preserve file-based config as baseline; explicit CLI flags have higher precedence, one
/// field at a time, so `--port` alone keeps the file's `ip`.
/// 中文：以設定檔為基礎，命令列參數逐欄位覆寫（只給 `--port` 時保留設定檔的 `ip`）。
pub fn build_config_from_cli(mut s: Cofg, cli: &cli::Args) -> Cofg {
  if let Some(ip) = &cli.ip {
    s.addrs.ip = ip.clone();
  }
  if let Some(port) = cli.port {
    s.addrs.port = port;
  }
  s
}

/// Apply `smoke` overrides on top of [`build_config_from_cli`].
///
/// WHY: `--timeout-ms` only matters for a smoke run, so it lives on the subcommand instead of the
/// global flags. clap already rejects `0`.
/// 中文：`--timeout-ms` 只影響 smoke 執行，因此放在子命令；`0` 已由 clap 拒絕。
pub fn build_config_from_smoke(mut s: Cofg, smoke: &cli::SmokeArgs) -> Cofg {
  if let Some(timeout_ms) = smoke.timeout_ms {
    s.probe.timeout_ms = timeout_ms;
  }
  s
}
