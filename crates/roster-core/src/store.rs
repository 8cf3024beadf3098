//! The `RecordStore` trait and its change-notification contract.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The services in `roster-sync` depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use tokio::sync::broadcast;

use crate::{projection::Projection, record::Record};

// ─── Change notifications ────────────────────────────────────────────────────

/// What a committed mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
  Inserted,
  Updated,
  Deleted,
  Cleared,
}

/// Which slice of the store a mutation may have touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
  /// Records of either provenance, or unknown.
  All,
  /// Only records whose `is_manual` equals the flag.
  Provenance(bool),
}

impl ChangeScope {
  /// Narrowest scope covering every flag in `flags`.
  pub fn covering(flags: impl IntoIterator<Item = bool>) -> Self {
    let mut flags = flags.into_iter();
    match flags.next() {
      Some(first) if flags.all(|f| f == first) => Self::Provenance(first),
      _ => Self::All,
    }
  }

  pub fn touches(self, is_manual: bool) -> bool {
    match self {
      Self::All => true,
      Self::Provenance(flag) => flag == is_manual,
    }
  }
}

/// Published once per committed mutation, after the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
  pub kind:     ChangeKind,
  pub scope:    ChangeScope,
  /// Store revision this mutation produced. Revisions start at 1 and grow
  /// by one per committed mutation, in commit order.
  pub revision: u64,
}

impl StoreChange {
  pub fn new(kind: ChangeKind, scope: ChangeScope, revision: u64) -> Self {
    Self { kind, scope, revision }
  }
}

pub type ChangeSender = broadcast::Sender<StoreChange>;
pub type ChangeReceiver = broadcast::Receiver<StoreChange>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a durable record store.
///
/// Writes are upserts keyed on the record identifier. Every mutation that
/// changes at least one row is atomic and publishes exactly one
/// [`StoreChange`] after it commits, so a subscriber that re-reads on
/// notification never observes a half-applied mutation.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert or fully replace the row with `record.id`.
  fn insert(
    &self,
    record: Record,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert or replace every record in one transaction: all rows land or
  /// none do.
  fn insert_batch(
    &self,
    records: Vec<Record>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the editable fields of an existing row and refresh
  /// `updated_at`. Identifier, lookup key, provenance and `created_at` are
  /// kept from the stored row. Fails with a not-found error if the
  /// identifier is absent.
  fn update(
    &self,
    record: Record,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Remove one record. Returns whether a row was removed.
  fn delete<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove every record. Returns the number removed.
  fn delete_all(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Remove every record whose `is_manual` equals `is_manual`.
  fn delete_where_manual(
    &self,
    is_manual: bool,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Point lookup by identifier; `None` if absent.
  fn get_by_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// Point lookup by lookup key; `None` if absent.
  fn get_by_lookup_key<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn count_where_manual(
    &self,
    is_manual: bool,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Evaluate a projection once.
  fn query<'a>(
    &'a self,
    projection: &'a Projection,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + 'a;

  /// Evaluate a projection and report the revision it reflects: every
  /// [`StoreChange`] with a revision at or below it is already visible in
  /// the returned rows. `0` means no mutation has committed yet.
  fn query_with_revision<'a>(
    &'a self,
    projection: &'a Projection,
  ) -> impl Future<Output = Result<(u64, Vec<Record>), Self::Error>> + Send + 'a;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Receive every [`StoreChange`] published after this call.
  fn subscribe(&self) -> ChangeReceiver;
}
