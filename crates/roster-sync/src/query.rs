//! Read side: one-shot lookups and live projections over the store.

use std::sync::Arc;

use roster_core::{
  Result,
  projection::{Projection, Statistics, ViewSelection},
  record::Record,
  scan::extract_record_id,
  store::RecordStore,
};

use crate::{
  StoreResultExt as _,
  live::{LiveQuery, LiveStatistics, ViewSession},
};

pub struct QueryService<S> {
  store:  Arc<S>,
  buffer: usize,
}

impl<S> Clone for QueryService<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), buffer: self.buffer } }
}

impl<S: RecordStore + 'static> QueryService<S> {
  /// `buffer` bounds the snapshots each live query holds for a slow reader.
  pub fn new(store: Arc<S>, buffer: usize) -> Self { Self { store, buffer } }

  /// Evaluate `projection` once.
  pub async fn snapshot(&self, projection: &Projection) -> Result<Vec<Record>> {
    self.store.query(projection).await.into_core()
  }

  pub async fn statistics(&self) -> Result<Statistics> {
    let all = self.snapshot(&Projection::Newest).await?;
    Ok(Statistics::from_records(&all))
  }

  pub async fn get_by_id(&self, id: &str) -> Result<Option<Record>> {
    self.store.get_by_id(id).await.into_core()
  }

  pub async fn count(&self) -> Result<usize> { self.store.count().await.into_core() }

  pub async fn count_where_manual(&self, is_manual: bool) -> Result<usize> {
    self.store.count_where_manual(is_manual).await.into_core()
  }

  /// Resolve a scanned token to the record it tags.
  ///
  /// Anything that is not a record tag, and any tag whose record is gone,
  /// resolves to `None`.
  pub async fn resolve_scan(&self, scanned: &str) -> Result<Option<Record>> {
    let Some(id) = extract_record_id(scanned) else {
      tracing::debug!("scan is not a record tag");
      return Ok(None);
    };
    self
      .store
      .get_by_lookup_key(scanned.trim())
      .await
      .into_core()
      .map(|found| found.filter(|record| record.id == id))
  }

  pub fn live(&self, projection: Projection) -> LiveQuery {
    LiveQuery::spawn(self.store.clone(), projection, self.buffer)
  }

  pub fn live_statistics(&self) -> LiveStatistics {
    LiveStatistics::spawn(self.store.clone(), self.buffer)
  }

  pub fn session(&self, selection: ViewSelection) -> ViewSession<S> {
    ViewSession::new(self.store.clone(), selection, self.buffer)
  }
}

#[cfg(test)]
mod tests {
  use roster_core::mapper::{ManualInput, build_manual};
  use roster_store_sqlite::SqliteStore;

  use super::*;

  async fn seeded() -> (Arc<SqliteStore>, QueryService<SqliteStore>, Record) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let mut record = build_manual(&ManualInput::new("Anna", "Miller", "anna@example.com"), 1).unwrap();
    record.country = "Germany".into();
    record.gender = "Female".into();
    store.insert(record.clone()).await.unwrap();
    (store.clone(), QueryService::new(store, 4), record)
  }

  #[tokio::test]
  async fn scan_resolves_tagged_records() {
    let (_, queries, record) = seeded().await;

    let found = queries.resolve_scan(&format!("  {}\n", record.lookup_key)).await.unwrap();
    assert_eq!(found.map(|r| r.id), Some(record.id.clone()));
  }

  #[tokio::test]
  async fn scan_noise_is_no_match() {
    let (_, queries, _) = seeded().await;
    assert!(queries.resolve_scan("").await.unwrap().is_none());
    assert!(queries.resolve_scan("https://example.com").await.unwrap().is_none());
    assert!(queries.resolve_scan("RECORDTAG:").await.unwrap().is_none());
    assert!(queries.resolve_scan("RECORDTAG:unknown").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn statistics_snapshot() {
    let (_, queries, _) = seeded().await;
    let stats = queries.statistics().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.remote, 0);
    assert_eq!(stats.genders, ["Female"]);
  }

  #[tokio::test]
  async fn live_query_starts_with_current_rows() {
    let (_, queries, record) = seeded().await;
    let mut live = queries.live(Projection::Search("ann".into()));
    let snapshot = live.next().await.unwrap().unwrap();
    assert_eq!(snapshot.records, vec![record]);
  }
}
