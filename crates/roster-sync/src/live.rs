//! Live projections: push-based views that follow store mutations.
//!
//! Each [`LiveQuery`] owns a background task that subscribes to the store's
//! change channel, evaluates its projection once, and then re-evaluates after
//! every committed mutation that could have changed the result. Snapshots
//! travel over a bounded per-query channel, so dropping the handle discards
//! anything not yet delivered along with the task itself.

use std::sync::Arc;

use roster_core::{
  Result,
  projection::{Projection, SortOrder, SourceFilter, Statistics, ViewSelection},
  record::Record,
  store::{ChangeReceiver, RecordStore},
};
use tokio::{
  sync::{
    broadcast::error::{RecvError, TryRecvError},
    mpsc,
  },
  task::JoinHandle,
};

use crate::StoreResultExt as _;

/// One evaluation of a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
  pub projection: Projection,
  /// 1 for the initial evaluation, incremented on every re-evaluation.
  pub revision:   u64,
  pub records:    Vec<Record>,
}

// ─── LiveQuery ───────────────────────────────────────────────────────────────

/// Handle to a running subscription. Dropping it cancels the subscription.
pub struct LiveQuery {
  projection: Projection,
  rx:         mpsc::Receiver<Result<Snapshot>>,
  task:       JoinHandle<()>,
}

impl LiveQuery {
  /// Start following `projection` on `store`.
  ///
  /// The change subscription is taken before the task starts, so a
  /// mutation committed after this call returns is never missed.
  pub fn spawn<S>(store: Arc<S>, projection: Projection, buffer: usize) -> Self
  where
    S: RecordStore + 'static,
  {
    let changes = store.subscribe();
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let task = tokio::spawn(follow(store, projection.clone(), changes, tx));
    Self { projection, rx, task }
  }

  pub fn projection(&self) -> &Projection { &self.projection }

  /// Wait for the next snapshot. The first call yields the initial
  /// evaluation. `None` means the subscription has ended.
  pub async fn next(&mut self) -> Option<Result<Snapshot>> { self.rx.recv().await }
}

impl Drop for LiveQuery {
  fn drop(&mut self) { self.task.abort(); }
}

async fn follow<S: RecordStore>(
  store: Arc<S>,
  projection: Projection,
  mut changes: ChangeReceiver,
  tx: mpsc::Sender<Result<Snapshot>>,
) {
  let mut revision = 0;
  // Store revision already reflected in the last delivered snapshot.
  let mut covered = 0;

  loop {
    let evaluated = store
      .query_with_revision(&projection)
      .await
      .into_core()
      .map(|(seen, records)| {
        covered = seen;
        revision += 1;
        Snapshot { projection: projection.clone(), revision, records }
      });

    match &evaluated {
      Ok(snapshot) => tracing::debug!(
        projection = projection.name(),
        revision = snapshot.revision,
        store_revision = covered,
        rows = snapshot.records.len(),
        "projection evaluated"
      ),
      Err(e) => tracing::warn!(projection = projection.name(), error = %e, "projection failed"),
    }

    if tx.send(evaluated).await.is_err() {
      // Consumer went away.
      return;
    }

    if !wait_for_relevant_change(&projection, covered, &mut changes).await {
      return;
    }
  }
}

/// Block until a change that may affect `projection` and is newer than
/// store revision `covered` arrives, then swallow whatever else is already
/// queued since the next evaluation covers it. Returns `false` once the
/// store has shut its channel.
async fn wait_for_relevant_change(
  projection: &Projection,
  covered: u64,
  changes: &mut ChangeReceiver,
) -> bool {
  loop {
    match changes.recv().await {
      Ok(change) if change.revision > covered && projection.is_affected_by(&change) => break,
      Ok(_) => continue,
      Err(RecvError::Lagged(missed)) => {
        tracing::debug!(projection = projection.name(), missed, "change feed lagged; catching up");
        break;
      }
      Err(RecvError::Closed) => return false,
    }
  }

  loop {
    match changes.try_recv() {
      Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
      Err(TryRecvError::Empty) => return true,
      Err(TryRecvError::Closed) => return false,
    }
  }
}

// ─── LiveStatistics ──────────────────────────────────────────────────────────

/// [`Statistics`] recomputed whenever the full record set changes.
pub struct LiveStatistics {
  inner: LiveQuery,
}

impl LiveStatistics {
  pub fn spawn<S>(store: Arc<S>, buffer: usize) -> Self
  where
    S: RecordStore + 'static,
  {
    Self { inner: LiveQuery::spawn(store, Projection::Newest, buffer) }
  }

  pub async fn next(&mut self) -> Option<Result<Statistics>> {
    let snapshot = self.inner.next().await?;
    Some(snapshot.map(|s| Statistics::from_records(&s.records)))
  }
}

// ─── ViewSession ─────────────────────────────────────────────────────────────

/// A single consumer's view: one selection, one active subscription.
///
/// Changing the selection to something that maps to a different projection
/// replaces the subscription. The old one is cancelled before the new one is
/// started, and its undelivered snapshots are discarded with it, so `next`
/// never yields a snapshot of a projection that is no longer selected.
pub struct ViewSession<S> {
  store:     Arc<S>,
  buffer:    usize,
  selection: ViewSelection,
  active:    LiveQuery,
}

impl<S: RecordStore + 'static> ViewSession<S> {
  pub fn new(store: Arc<S>, selection: ViewSelection, buffer: usize) -> Self {
    let active = LiveQuery::spawn(store.clone(), selection.projection(), buffer);
    Self { store, buffer, selection, active }
  }

  pub fn selection(&self) -> &ViewSelection { &self.selection }

  pub fn projection(&self) -> &Projection { self.active.projection() }

  /// Apply a new selection. Returns whether the subscription was replaced.
  pub fn select(&mut self, selection: ViewSelection) -> bool {
    let projection = selection.projection();
    self.selection = selection;
    if &projection == self.active.projection() {
      return false;
    }
    self.restart(projection);
    true
  }

  /// Follow an explicit projection regardless of the current selection.
  pub fn switch(&mut self, projection: Projection) {
    if &projection != self.active.projection() {
      self.restart(projection);
    }
  }

  pub fn set_sort(&mut self, sort: SortOrder) -> bool {
    self.select(ViewSelection { sort, ..self.selection.clone() })
  }

  pub fn set_filter(&mut self, filter: SourceFilter) -> bool {
    self.select(ViewSelection { filter, ..self.selection.clone() })
  }

  pub fn set_search(&mut self, search: impl Into<String>) -> bool {
    self.select(ViewSelection { search: search.into(), ..self.selection.clone() })
  }

  pub fn clear_search(&mut self) -> bool { self.set_search(String::new()) }

  pub async fn next(&mut self) -> Option<Result<Snapshot>> { self.active.next().await }

  fn restart(&mut self, projection: Projection) {
    tracing::debug!(from = self.active.projection().name(), to = projection.name(), "switching view");
    // Assigning drops the previous handle, which aborts its task.
    self.active = LiveQuery::spawn(self.store.clone(), projection, self.buffer);
  }
}
