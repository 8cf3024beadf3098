//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use chrono::Utc;
use roster_core::{
  projection::Projection,
  record::Record,
  store::{ChangeKind, ChangeReceiver, ChangeScope, ChangeSender, RecordStore, StoreChange},
};
use rusqlite::{OptionalExtension as _, params_from_iter};
use tokio::sync::broadcast;

use crate::{
  Error, Result,
  encode::{
    COLUMNS, INSERT_OR_REPLACE, UPDATE_FIELDS, insert_params, projection_sql,
    read_record, register_functions, update_params,
  },
  schema::{DROP_ALL, SCHEMA, SCHEMA_VERSION},
};

/// Notifications buffered per subscriber before it is reported as lagged.
const CHANGE_CAPACITY: usize = 256;

/// Count of committed mutations.
///
/// Only advanced and read inside `Connection::call` closures, which run one
/// at a time on the connection thread, so a read taken alongside a query
/// names exactly the mutations that query can see.
#[derive(Clone, Default)]
struct Revision(Arc<AtomicU64>);

impl Revision {
  fn advance(&self) -> u64 { self.0.fetch_add(1, Ordering::SeqCst) + 1 }

  fn current(&self) -> u64 { self.0.load(Ordering::SeqCst) }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and the change channel are
/// reference-counted, and every clone publishes to the same subscribers.
#[derive(Clone)]
pub struct SqliteStore {
  conn:     tokio_rusqlite::Connection,
  changes:  ChangeSender,
  revision: Revision,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
    let store = Self { conn, changes, revision: Revision::default() };
    store.conn.call(|conn| Ok(register_functions(conn)?)).await?;
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Other clones fail afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    let stale_version = self
      .conn
      .call(|conn| {
        let version: i64 =
          conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let stale = version != 0 && version != SCHEMA_VERSION;
        if stale {
          conn.execute_batch(DROP_ALL)?;
        }
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(stale.then_some(version))
      })
      .await?;

    if let Some(version) = stale_version {
      tracing::warn!(
        found = version,
        expected = SCHEMA_VERSION,
        "incompatible schema version; records table recreated"
      );
    }
    Ok(())
  }

  /// Publish a committed change. Having no subscribers is not an error.
  fn publish(&self, kind: ChangeKind, scope: ChangeScope, revision: u64) {
    self.changes.send(StoreChange::new(kind, scope, revision)).ok();
  }

  async fn select_one(&self, column: &'static str, value: String) -> Result<Option<Record>> {
    let record = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {COLUMNS} FROM records WHERE {column} = ?1");
        Ok(conn.query_row(&sql, [value], read_record).optional()?)
      })
      .await?;
    Ok(record)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert(&self, record: Record) -> Result<()> {
    self.insert_batch(vec![record]).await
  }

  async fn insert_batch(&self, records: Vec<Record>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    let revision = self.revision.clone();
    let (scope, rev) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Replaced rows may belong to the other provenance slice; include
        // their flags so provenance-filtered views hear about it.
        let mut flags = Vec::with_capacity(records.len());
        {
          let mut existing =
            tx.prepare("SELECT is_manual FROM records WHERE id = ?1")?;
          let mut insert = tx.prepare(INSERT_OR_REPLACE)?;
          for record in &records {
            if let Some(old) = existing
              .query_row([&record.id], |row| row.get::<_, bool>(0))
              .optional()?
            {
              flags.push(old);
            }
            flags.push(record.is_manual);
            insert.execute(params_from_iter(insert_params(record)))?;
          }
        }
        tx.commit()?;
        Ok((ChangeScope::covering(flags), revision.advance()))
      })
      .await?;

    self.publish(ChangeKind::Inserted, scope, rev);
    Ok(())
  }

  async fn update(&self, record: Record) -> Result<Record> {
    let id = record.id.clone();
    let now = Utc::now().timestamp_millis();

    let revision = self.revision.clone();
    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed =
          tx.execute(UPDATE_FIELDS, params_from_iter(update_params(&record, now)))?;
        if changed == 0 {
          return Ok(None);
        }
        let stored = tx.query_row(
          &format!("SELECT {COLUMNS} FROM records WHERE id = ?1"),
          [&record.id],
          read_record,
        )?;
        tx.commit()?;
        Ok(Some((stored, revision.advance())))
      })
      .await?;

    let (updated, rev) = updated.ok_or(Error::NotFound(id))?;
    self.publish(ChangeKind::Updated, ChangeScope::Provenance(updated.is_manual), rev);
    Ok(updated)
  }

  async fn delete(&self, id: &str) -> Result<bool> {
    let id = id.to_owned();

    let revision = self.revision.clone();
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let flag: Option<bool> = tx
          .query_row("SELECT is_manual FROM records WHERE id = ?1", [&id], |row| {
            row.get(0)
          })
          .optional()?;
        let Some(flag) = flag else {
          return Ok(None);
        };
        tx.execute("DELETE FROM records WHERE id = ?1", [&id])?;
        tx.commit()?;
        Ok(Some((flag, revision.advance())))
      })
      .await?;

    match removed {
      Some((is_manual, rev)) => {
        self.publish(ChangeKind::Deleted, ChangeScope::Provenance(is_manual), rev);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn delete_all(&self) -> Result<usize> {
    let revision = self.revision.clone();
    let (removed, rev) = self
      .conn
      .call(move |conn| {
        let removed = conn.execute("DELETE FROM records", [])?;
        Ok((removed, (removed > 0).then(|| revision.advance())))
      })
      .await?;

    if let Some(rev) = rev {
      self.publish(ChangeKind::Cleared, ChangeScope::All, rev);
    }
    Ok(removed)
  }

  async fn delete_where_manual(&self, is_manual: bool) -> Result<usize> {
    let revision = self.revision.clone();
    let (removed, rev) = self
      .conn
      .call(move |conn| {
        let removed = conn.execute("DELETE FROM records WHERE is_manual = ?1", [is_manual])?;
        Ok((removed, (removed > 0).then(|| revision.advance())))
      })
      .await?;

    if let Some(rev) = rev {
      self.publish(ChangeKind::Deleted, ChangeScope::Provenance(is_manual), rev);
    }
    Ok(removed)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_by_id(&self, id: &str) -> Result<Option<Record>> {
    self.select_one("id", id.to_owned()).await
  }

  async fn get_by_lookup_key(&self, key: &str) -> Result<Option<Record>> {
    self.select_one("lookup_key", key.to_owned()).await
  }

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?))
      .await?;
    Ok(n as usize)
  }

  async fn count_where_manual(&self, is_manual: bool) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM records WHERE is_manual = ?1",
          [is_manual],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(n as usize)
  }

  async fn query(&self, projection: &Projection) -> Result<Vec<Record>> {
    let (_, records) = self.query_with_revision(projection).await?;
    Ok(records)
  }

  async fn query_with_revision(&self, projection: &Projection) -> Result<(u64, Vec<Record>)> {
    let (sql, params) = projection_sql(projection);

    let revision = self.revision.clone();
    let result = self
      .conn
      .call(move |conn| {
        let seen = revision.current();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), read_record)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((seen, rows))
      })
      .await?;
    Ok(result)
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  fn subscribe(&self) -> ChangeReceiver { self.changes.subscribe() }
}
