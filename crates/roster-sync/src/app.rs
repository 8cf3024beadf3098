//! [`Roster`]: the wired-up application core.

use std::sync::Arc;

use roster_core::{Result, store::RecordStore};
use roster_remote::{RandomUserClient, RemoteSource};
use roster_store_sqlite::SqliteStore;

use crate::{
  StoreResultExt as _,
  config::Settings,
  importer::Importer,
  manual::ManualEntryService,
  query::QueryService,
};

/// Store, remote client and the services layered over them.
///
/// Services share the store through an `Arc`; cloning a service hands out
/// another view of the same store.
pub struct Roster<S = SqliteStore, R = RandomUserClient> {
  store:    Arc<S>,
  settings: Settings,
  importer: Importer<S, R>,
  manual:   ManualEntryService<S>,
  queries:  QueryService<S>,
}

impl Roster {
  /// Open the SQLite store at `settings.store_path` and build the HTTP
  /// client. Bootstraps an empty store when `settings.import.bootstrap` is
  /// set; a failed bootstrap is logged and the store opens anyway.
  pub async fn open(settings: Settings) -> Result<Self> {
    tracing::info!(path = %settings.store_path.display(), "opening record store");
    let store = SqliteStore::open(&settings.store_path).await.into_core()?;
    let client = RandomUserClient::new(settings.remote.client_config())?;
    let roster = Self::from_parts(store, client, settings);

    if roster.settings.import.bootstrap
      && let Err(e) = roster.importer.bootstrap_if_empty(roster.settings.import.initial_batch).await
    {
      tracing::warn!(error = %e, "bootstrap import failed; continuing offline");
    }
    Ok(roster)
  }

  /// Close the store. Services cloned out of this value stop working.
  pub async fn close(self) -> Result<()> {
    let store = SqliteStore::clone(&self.store);
    drop(self);
    store.close().await.into_core()
  }
}

impl<S: RecordStore + 'static, R: RemoteSource> Roster<S, R> {
  pub fn from_parts(store: S, source: R, settings: Settings) -> Self {
    let store = Arc::new(store);
    let importer = Importer::new(store.clone(), Arc::new(source), settings.remote.import_options());
    let manual = ManualEntryService::new(store.clone());
    let queries = QueryService::new(store.clone(), settings.live.buffer);
    Self { store, settings, importer, manual, queries }
  }

  pub fn settings(&self) -> &Settings { &self.settings }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn importer(&self) -> &Importer<S, R> { &self.importer }

  pub fn manual(&self) -> &ManualEntryService<S> { &self.manual }

  pub fn queries(&self) -> &QueryService<S> { &self.queries }

  /// Import `settings.import.default_batch` records.
  pub async fn import_default_batch(&self) -> Result<usize> {
    let records = self.importer.import_batch(self.settings.import.default_batch).await?;
    Ok(records.len())
  }

  pub async fn delete(&self, id: &str) -> Result<bool> {
    let removed = self.store.delete(id).await.into_core()?;
    if removed {
      tracing::info!(id, "deleted record");
    }
    Ok(removed)
  }

  pub async fn delete_all(&self) -> Result<usize> {
    let removed = self.store.delete_all().await.into_core()?;
    tracing::info!(removed, "deleted all records");
    Ok(removed)
  }

  pub async fn delete_where_manual(&self, is_manual: bool) -> Result<usize> {
    let removed = self.store.delete_where_manual(is_manual).await.into_core()?;
    tracing::info!(removed, is_manual, "deleted records by provenance");
    Ok(removed)
  }
}
