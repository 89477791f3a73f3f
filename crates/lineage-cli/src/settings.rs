//! Runtime settings: an optional TOML file layered under `LINEAGE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use lineage_core::traverse::DEFAULT_MAX_DEPTH;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
  /// Hard cap on ancestor/descendant walks.
  pub max_depth:  usize,
  /// Page size for person listings when none is given.
  pub list_limit: usize,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("lineage.db"),
      max_depth:  DEFAULT_MAX_DEPTH,
      list_limit: 50,
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply environment overrides
  /// (`LINEAGE_STORE_PATH`, `LINEAGE_MAX_DEPTH`, `LINEAGE_LIST_LIMIT`).
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LINEAGE").try_parsing(true))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")?;

    Ok(Self { store_path: expand_tilde(&settings.store_path), ..settings })
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
