//! Configuration (Cofg)
//!
//! Built-in defaults are embedded from `cofg.yaml` next to this file. Any file loaded from disk
//! is layered over them, so a config file only needs the keys it changes. CLI flags are merged
//! last (see [`super::build_config_from_cli`]).
//!
//! 中文：內建預設值由同目錄的 `cofg.yaml` 於編譯期嵌入；磁碟上的設定檔疊加其上，只需寫要
//! 變更的欄位；命令列參數最後套用。

use log::debug;
use nest_struct::nest_struct;
use std::{ path::Path, time::Duration };

pub(crate) const BUILD_COFG: &str = include_str!("cofg.yaml");

#[nest_struct]
#[derive(PartialEq, Clone, Debug, serde::Deserialize)]
pub struct Cofg {
  pub addrs: nest! {
      /// Server IP address (e.g., 127.0.0.1)
      pub ip: String,
      /// Server port (e.g., 80, 8080); 0 picks a free port
      pub port: u16,
    },
  /// Worker threads; `None` uses the actix default
  pub workers: Option<usize>,
  pub middleware: nest! {
      /// Enable NormalizePath middleware (trailing slash trimmed)
      pub normalize_path: bool,
      /// Enable Compress middleware
      pub compress: bool,
      pub logger: nest! {
        /// Enable request logging
        pub enabling: bool,
        /// Logger output format
        pub format: String
      },
    },
  pub probe: nest! {
      /// Upper bound for one probe, connect through last body byte
      pub timeout_ms: u64,
    },
}

impl Default for Cofg {
  fn default() -> Self {
    Self::builtin()
      .build()
      .and_then(|c| c.try_deserialize())
      .expect("built-in cofg.yaml must deserialize")
  }
}

impl Cofg {
  fn builtin() -> config::ConfigBuilder<config::builder::DefaultState> {
    config::Config
      ::builder()
      .add_source(config::File::from_str(BUILD_COFG, config::FileFormat::Yaml))
  }

  /// Layer `path` over the built-in defaults. A missing file is not an error.
  pub fn load_from_disk(path: &Path) -> Result<Self, config::ConfigError> {
    if !path.exists() {
      debug!("{} not found, using built-in cofg", path.display());
    }
    Self::new_from_source(config::File::from(path).required(false))
  }

  // Accept any owned source type that implements `config::Source`.
  pub fn new_from_source<T>(source: T) -> Result<Self, config::ConfigError>
    where T: config::Source + Send + Sync + 'static
  {
    Self::builtin().add_source(source).build()?.try_deserialize::<Self>()?.validate()
  }

  /// Reject values that deserialize fine but make the server or the smoke run unusable.
  fn validate(self) -> Result<Self, config::ConfigError> {
    if self.probe.timeout_ms == 0 {
      // every probe would time out before connecting
      return Err(config::ConfigError::Message("probe.timeout_ms must be greater than 0".into()));
    }
    if self.workers == Some(0) {
      return Err(config::ConfigError::Message("workers must be greater than 0".into()));
    }
    Ok(self)
  }

  pub fn new_from_str(data_str: &str) -> Result<Self, config::ConfigError> {
    Self::new_from_source(config::File::from_str(data_str, config::FileFormat::Yaml))
  }

  pub fn probe_timeout(&self) -> Duration {
    Duration::from_millis(self.probe.timeout_ms)
  }
}

impl std::fmt::Display for CofgAddrs {
  /// Format the address as `IP:Port`.
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.ip, self.port)
  }
}

impl std::net::ToSocketAddrs for CofgAddrs {
  type Iter = std::vec::IntoIter<std::net::SocketAddr>;

  fn to_socket_addrs(&self) -> std::io::Result<Self::Iter> {
    std::net::ToSocketAddrs::to_socket_addrs(&(self.ip.as_str(), self.port))
  }
}
