//! Runtime configuration.
//!
//! One explicit [`Settings`] value is built at start-up (the binary layers a
//! TOML file under `ROSTER_*` environment variables) and handed to
//! [`crate::Roster::open`]. Nothing reads settings from ambient global state.

use std::{path::PathBuf, time::Duration};

use roster_remote::{Gender, RemoteConfig};
use serde::Deserialize;

use crate::importer::ImportOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite file holding the records table.
  pub store_path: PathBuf,
  pub remote:     RemoteSettings,
  pub import:     ImportSettings,
  pub live:       LiveSettings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("roster.db"),
      remote:     RemoteSettings::default(),
      import:     ImportSettings::default(),
      live:       LiveSettings::default(),
    }
  }
}

/// Where and how to reach the identity generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
  pub base_url:     String,
  pub timeout_secs: u64,
  pub nationality:  Option<String>,
  pub gender:       Option<Gender>,
  pub seed:         Option<String>,
}

impl Default for RemoteSettings {
  fn default() -> Self {
    Self {
      base_url:     "https://randomuser.me".into(),
      timeout_secs: 30,
      nationality:  None,
      gender:       None,
      seed:         None,
    }
  }
}

impl RemoteSettings {
  pub fn client_config(&self) -> RemoteConfig {
    RemoteConfig {
      base_url: self.base_url.clone(),
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }

  pub fn import_options(&self) -> ImportOptions {
    ImportOptions {
      nationality: self.nationality.clone(),
      gender:      self.gender,
      seed:        self.seed.clone(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
  /// Batch size used when the caller does not name one.
  pub default_batch: u32,
  /// Batch size fetched when an empty store is bootstrapped.
  pub initial_batch: u32,
  /// Import `initial_batch` records on start-up if the store is empty.
  pub bootstrap:     bool,
}

impl Default for ImportSettings {
  fn default() -> Self {
    Self { default_batch: 10, initial_batch: 10, bootstrap: false }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiveSettings {
  /// Snapshots buffered per live query before the producer waits.
  pub buffer: usize,
}

impl Default for LiveSettings {
  fn default() -> Self { Self { buffer: 16 } }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_documents_fill_defaults() {
    let settings: Settings = serde_json::from_str(
      r#"{ "remote": { "gender": "female", "timeout_secs": 5 }, "import": { "bootstrap": true } }"#,
    )
    .unwrap();

    assert_eq!(settings.store_path, PathBuf::from("roster.db"));
    assert_eq!(settings.remote.base_url, "https://randomuser.me");
    assert_eq!(settings.remote.gender, Some(Gender::Female));
    assert_eq!(settings.remote.client_config().timeout, Duration::from_secs(5));
    assert!(settings.import.bootstrap);
    assert_eq!(settings.import.default_batch, 10);
    assert_eq!(settings.live.buffer, 16);
  }
}
