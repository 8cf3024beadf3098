//! Create and edit hand-entered records.

use std::sync::Arc;

use roster_core::{
  Error, Result,
  mapper::{ManualInput, apply_edit, build_manual},
  record::Record,
  store::RecordStore,
};

use crate::{StoreResultExt as _, now_millis};

pub struct ManualEntryService<S> {
  store: Arc<S>,
}

impl<S> Clone for ManualEntryService<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: RecordStore> ManualEntryService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Validate `input` and persist it as a new manual record.
  ///
  /// Invalid input never reaches the store.
  pub async fn create(&self, input: &ManualInput) -> Result<Record> {
    let record = build_manual(input, now_millis())?;
    self.store.insert(record.clone()).await.into_core()?;
    tracing::info!(id = %record.id, "created manual record");
    Ok(record)
  }

  /// Replace the editable fields of record `id`.
  ///
  /// Remote records may be edited too; their provenance does not change.
  pub async fn edit(&self, id: &str, input: &ManualInput) -> Result<Record> {
    let existing = self
      .store
      .get_by_id(id)
      .await
      .into_core()?
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;

    let edited = apply_edit(&existing, input)?;
    let saved = self.store.update(edited).await.into_core()?;
    tracing::info!(id = %saved.id, is_manual = saved.is_manual, "edited record");
    Ok(saved)
  }
}
