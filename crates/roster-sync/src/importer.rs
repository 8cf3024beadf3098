//! Pulls pages from the remote source into the store.

use std::sync::Arc;

use roster_core::{Error, Result, mapper::map_remote_batch, record::Record, store::RecordStore};
use roster_remote::{FetchRequest, Gender, RemoteSource};

use crate::{StoreResultExt as _, now_millis};

/// Filters forwarded with every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
  pub nationality: Option<String>,
  pub gender:      Option<Gender>,
  pub seed:        Option<String>,
}

impl ImportOptions {
  fn request(&self, count: u32) -> FetchRequest {
    FetchRequest {
      nationality: self.nationality.clone(),
      gender: self.gender,
      seed: self.seed.clone(),
      ..FetchRequest::new(count)
    }
  }
}

/// Fetches, maps and persists remote identities.
///
/// A batch is all-or-nothing: a transport failure, a non-success status, an
/// empty page or a single unusable identity leaves the store untouched.
pub struct Importer<S, R> {
  store:   Arc<S>,
  source:  Arc<R>,
  options: ImportOptions,
}

impl<S, R> Clone for Importer<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      source:  self.source.clone(),
      options: self.options.clone(),
    }
  }
}

impl<S: RecordStore, R: RemoteSource> Importer<S, R> {
  pub fn new(store: Arc<S>, source: Arc<R>, options: ImportOptions) -> Self {
    Self { store, source, options }
  }

  pub fn options(&self) -> &ImportOptions { &self.options }

  /// Fetch `count` identities and upsert them in one transaction.
  ///
  /// Returns the records as persisted. Re-importing an identity that is
  /// already stored replaces it rather than duplicating it.
  pub async fn import_batch(&self, count: u32) -> Result<Vec<Record>> {
    if count == 0 {
      return Err(Error::Validation("batch size must be at least 1".into()));
    }

    let request = self.options.request(count);
    let page = self.source.fetch(&request).await.inspect_err(|e| {
      tracing::warn!(count, error = %e, "remote fetch failed");
    })?;

    if page.results.is_empty() {
      tracing::warn!(count, "remote source returned an empty page");
      return Err(Error::EmptyResponse);
    }

    let records = map_remote_batch(&page.results, now_millis()).map_err(|e| {
      tracing::warn!(error = %e, "rejecting malformed remote page");
      Error::Remote(format!("malformed page: {e}"))
    })?;

    self
      .store
      .insert_batch(records.clone())
      .await
      .into_core()?;

    tracing::info!(requested = count, imported = records.len(), "imported remote records");
    Ok(records)
  }

  /// Import a single identity.
  pub async fn import_one(&self) -> Result<Record> {
    let mut records = self.import_batch(1).await?;
    // A page may carry more than requested; the first one is the answer.
    records.truncate(1);
    records.pop().ok_or(Error::EmptyResponse)
  }

  /// Import `initial` records if, and only if, the store holds nothing.
  pub async fn bootstrap_if_empty(&self, initial: u32) -> Result<Option<Vec<Record>>> {
    let existing = self.store.count().await.into_core()?;
    if existing > 0 {
      tracing::debug!(existing, "store already populated; skipping bootstrap");
      return Ok(None);
    }
    tracing::info!(initial, "empty store; bootstrapping from remote source");
    self.import_batch(initial).await.map(Some)
  }
}

#[cfg(test)]
mod tests {
  use roster_core::store::RecordStore as _;
  use roster_store_sqlite::SqliteStore;

  use super::*;
  use crate::testing::{FakeSource, identity, page};

  type TestImporter = Importer<SqliteStore, FakeSource>;

  async fn setup(source: FakeSource) -> (Arc<SqliteStore>, Arc<FakeSource>, TestImporter) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let source = Arc::new(source);
    let importer = Importer::new(store.clone(), source.clone(), ImportOptions::default());
    (store, source, importer)
  }

  #[tokio::test]
  async fn batch_lands_as_remote_records() {
    let source = FakeSource::new().with_page(page(&[
      identity("a1", "anna", "smith"),
      identity("b2", "bob", "jones"),
    ]));
    let (store, _, importer) = setup(source).await;

    let imported = importer.import_batch(2).await.unwrap();
    assert_eq!(imported.len(), 2);
    assert!(imported.iter().all(|r| !r.is_manual));

    let stored = store.get_by_id("a1").await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Anna");
    assert_eq!(stored.lookup_key, "RECORDTAG:a1");
    assert_eq!(store.count().await.unwrap(), 2);
  }

  #[tokio::test]
  async fn reimporting_the_same_identity_does_not_duplicate() {
    let source = FakeSource::new()
      .with_page(page(&[identity("a1", "anna", "smith")]))
      .with_page(page(&[identity("a1", "anna", "smyth")]));
    let (store, _, importer) = setup(source).await;

    importer.import_batch(1).await.unwrap();
    importer.import_batch(1).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    let stored = store.get_by_id("a1").await.unwrap().unwrap();
    assert_eq!(stored.last_name, "Smyth");
  }

  #[tokio::test]
  async fn zero_count_is_rejected_without_a_fetch() {
    let (_, source, importer) = setup(FakeSource::new()).await;
    let err = importer.import_batch(0).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(source.calls(), 0);
  }

  #[tokio::test]
  async fn empty_page_writes_nothing() {
    let (store, _, importer) = setup(FakeSource::new().with_page(page(&[]))).await;
    let err = importer.import_batch(5).await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse));
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn remote_failure_writes_nothing() {
    let (store, _, importer) = setup(FakeSource::new().with_failure(503)).await;
    let err = importer.import_batch(3).await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn one_malformed_identity_rejects_the_page() {
    let source = FakeSource::new().with_page(page(&[
      identity("a1", "anna", "smith"),
      identity("  ", "nobody", "atall"),
    ]));
    let (store, _, importer) = setup(source).await;

    let err = importer.import_batch(2).await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn filters_are_forwarded() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let source = Arc::new(FakeSource::new().with_page(page(&[identity("a1", "anna", "smith")])));
    let options = ImportOptions {
      nationality: Some("de".into()),
      gender:      Some(Gender::Female),
      seed:        None,
    };
    let importer = Importer::new(store, source.clone(), options);

    importer.import_one().await.unwrap();
    let seen = source.last_request().unwrap();
    assert_eq!(seen.count, 1);
    assert_eq!(seen.nationality.as_deref(), Some("de"));
    assert_eq!(seen.gender, Some(Gender::Female));
  }

  #[tokio::test]
  async fn bootstrap_only_runs_on_an_empty_store() {
    let source = FakeSource::new()
      .with_page(page(&[identity("a1", "anna", "smith"), identity("b2", "bob", "jones")]))
      .with_page(page(&[identity("c3", "cara", "lee")]));
    let (store, source, importer) = setup(source).await;

    let first = importer.bootstrap_if_empty(2).await.unwrap();
    assert_eq!(first.map(|r| r.len()), Some(2));

    let second = importer.bootstrap_if_empty(2).await.unwrap();
    assert!(second.is_none());
    assert_eq!(source.calls(), 1);
    assert_eq!(store.count().await.unwrap(), 2);
  }
}
