//! `lineage` — command-line access to a family-history graph.
//!
//! Reads `lineage.toml` (or the path given with `--config`), opens the
//! SQLite store, runs one command, and prints its result as JSON on stdout.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! lineage person create --json '{"name": "Ada Byron", "birth_date": "1815"}'
//! lineage parent add 1 2 --kind adopted --adoption-date 1820
//! lineage person ancestors 2 --depth 3
//! ```

mod command;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use lineage_core::FamilyTree;
use lineage_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{command::Command, settings::Settings};

#[derive(Parser, Debug)]
#[command(name = "lineage", version, about = "Family-history graph store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "lineage.toml")]
  config: PathBuf,

  /// Database file; overrides `store_path` from the configuration.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(store) = cli.store {
    settings.store_path = store;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  tracing::debug!(path = ?settings.store_path, "store opened");

  let tree = FamilyTree::new(store)
    .with_max_depth(settings.max_depth)
    .with_list_limit(settings.list_limit);

  let result = command::run(&tree, cli.command).await?;
  println!("{}", serde_json::to_string_pretty(&result)?);
  Ok(())
}
