//! Remote Source Client for the random-identity generator.
//!
//! A thin request/response wrapper: one call, one page of identities or one
//! typed failure. No retry, no caching, no local state.

pub mod client;
pub mod error;
pub mod request;

use std::future::Future;

use roster_core::payload::RemotePage;

pub use client::{RandomUserClient, RemoteConfig};
pub use error::{RemoteError, Result};
pub use request::{FetchRequest, Format, Gender};

/// Anything that can hand back a page of generated identities.
///
/// Implementations must be side-effect-free on failure; the importer treats
/// every error as "nothing happened".
pub trait RemoteSource: Send + Sync {
  fn fetch<'a>(
    &'a self,
    request: &'a FetchRequest,
  ) -> impl Future<Output = Result<RemotePage>> + Send + 'a;
}
