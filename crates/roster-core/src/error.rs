//! Error kinds shared by every roster crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Bad manual input; recoverable by the user.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("record not found: {0}")]
  NotFound(String),

  /// Transport failure or non-success response from the remote source.
  #[error("remote source failed: {0}")]
  Remote(String),

  /// The remote call succeeded but carried zero records.
  #[error("remote source returned no records")]
  EmptyResponse,

  /// Durable-store I/O failure. Never retried by the store itself.
  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
