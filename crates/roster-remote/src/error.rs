//! Error type for `roster-remote`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
  /// Connection, TLS or timeout failure.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("unexpected status {status}: {body}")]
  Status { status: u16, body: String },

  #[error("malformed response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid request: {0}")]
  InvalidRequest(String),
}

impl From<RemoteError> for roster_core::Error {
  fn from(err: RemoteError) -> Self { Self::Remote(err.to_string()) }
}

pub type Result<T, E = RemoteError> = std::result::Result<T, E>;
