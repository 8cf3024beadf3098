//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("record not found: {0}")]
  NotFound(String),
}

impl From<Error> for roster_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::NotFound(id) => Self::NotFound(id),
      other => Self::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
