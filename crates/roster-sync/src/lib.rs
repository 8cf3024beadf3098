//! Synchronisation and query layer for roster.
//!
//! Bridges the remote source and manual entry into the store, and republishes
//! the store as live projections for presentation layers.
//!
//! # Wiring
//!
//! ```rust,ignore
//! let roster = Roster::open(settings).await?;
//! roster.importer().import_batch(10).await?;
//! let mut view = roster.queries().session(ViewSelection::default());
//! while let Some(snapshot) = view.next().await { /* render */ }
//! ```

pub mod app;
pub mod config;
pub mod importer;
pub mod live;
pub mod manual;
pub mod query;

#[cfg(test)]
mod testing;

pub use app::Roster;
pub use config::Settings;
pub use importer::{ImportOptions, Importer};
pub use live::{LiveQuery, LiveStatistics, Snapshot, ViewSession};
pub use manual::ManualEntryService;
pub use query::QueryService;

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 { chrono::Utc::now().timestamp_millis() }

/// Lifts a backend-specific store result into the shared error type.
pub(crate) trait StoreResultExt<T> {
  fn into_core(self) -> roster_core::Result<T>;
}

impl<T, E: Into<roster_core::Error>> StoreResultExt<T> for Result<T, E> {
  fn into_core(self) -> roster_core::Result<T> { self.map_err(Into::into) }
}
