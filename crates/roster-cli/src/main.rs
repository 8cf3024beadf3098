//! `roster` — command-line front end for the record store.
//!
//! Reads `roster.toml` (or the path given with `--config`), layers `ROSTER_*`
//! environment variables on top, opens the SQLite store and runs one
//! subcommand.
//!
//! ```
//! roster import 20 --nat de
//! roster add --first Ana --last Silva --email ana@example.pt
//! roster watch --sort name
//! ROSTER_REMOTE__TIMEOUT_SECS=5 roster stats
//! ```

mod args;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use args::{Cli, Command, FilterArg};
use clap::Parser;
use roster_core::projection::ViewSelection;
use roster_sync::{Roster, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut settings = load_settings(&cli.config)?;
  if let Some(store) = cli.store {
    settings.store_path = store;
  }
  settings.store_path = expand_tilde(&settings.store_path);

  if let Command::Import { nat, gender, seed, .. } = &cli.command {
    settings.remote.nationality = nat.clone().or(settings.remote.nationality);
    settings.remote.gender = gender.or(settings.remote.gender);
    settings.remote.seed = seed.clone().or(settings.remote.seed);
  }

  let store_path = settings.store_path.clone();
  let roster = Roster::open(settings)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let outcome = run(&roster, cli.command).await;
  roster.close().await.context("failed to close store")?;
  outcome
}

async fn run(roster: &Roster, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Import { count, .. } => {
      let count = count.unwrap_or(roster.settings().import.default_batch);
      let records = roster.importer().import_batch(count).await.context("import failed")?;
      println!("imported {} records", records.len());
      for record in &records {
        println!("{}", render::row(record));
      }
    }

    Command::Add(fields) => {
      let record = roster.manual().create(&fields.into()).await?;
      println!("{}", render::detail(&record));
    }

    Command::Edit { id, fields } => {
      let record = roster.manual().edit(&id, &fields.into()).await?;
      println!("{}", render::detail(&record));
    }

    Command::List(view) => {
      let projection = ViewSelection::from(view).projection();
      let records = roster.queries().snapshot(&projection).await?;
      for record in &records {
        println!("{}", render::row(record));
      }
    }

    Command::Watch(view) => {
      let mut session = roster.queries().session(view.into());
      loop {
        tokio::select! {
          snapshot = session.next() => match snapshot {
            Some(snapshot) => print!("{}", render::snapshot(&snapshot?)),
            None => break,
          },
          _ = tokio::signal::ctrl_c() => break,
        }
      }
    }

    Command::Show { id } => match roster.queries().get_by_id(&id).await? {
      Some(record) => print!("{}", render::detail(&record)),
      None => bail!("no record with id {id}"),
    },

    Command::Scan { token } => match roster.queries().resolve_scan(&token).await? {
      Some(record) => print!("{}", render::detail(&record)),
      None => println!("no match"),
    },

    Command::Stats { watch: false } => {
      print!("{}", render::statistics(&roster.queries().statistics().await?));
    }

    Command::Stats { watch: true } => {
      let mut stats = roster.queries().live_statistics();
      loop {
        tokio::select! {
          next = stats.next() => match next {
            Some(s) => print!("{}", render::statistics(&s?)),
            None => break,
          },
          _ = tokio::signal::ctrl_c() => break,
        }
      }
    }

    Command::Delete { id } => {
      if !roster.delete(&id).await? {
        bail!("no record with id {id}");
      }
      println!("deleted {id}");
    }

    Command::Clear { only } => {
      let removed = match only {
        FilterArg::All => roster.delete_all().await?,
        FilterArg::Remote => roster.delete_where_manual(false).await?,
        FilterArg::Manual => roster.delete_where_manual(true).await?,
      };
      println!("deleted {removed} records");
    }
  }
  Ok(())
}

/// Optional TOML file under `ROSTER_*` variables; nested keys use `__`,
/// e.g. `ROSTER_IMPORT__DEFAULT_BATCH=25`.
fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("ROSTER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tilde_expands_to_home() {
    let home = std::env::var("HOME").unwrap();
    assert_eq!(expand_tilde(Path::new("~/roster.db")), PathBuf::from(home).join("roster.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/roster.db")), PathBuf::from("/tmp/roster.db"));
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let dir = std::env::temp_dir().join("roster-cli-no-such-config.toml");
    let settings = load_settings(&dir).unwrap();
    assert_eq!(settings.import.default_batch, 10);
  }
}
