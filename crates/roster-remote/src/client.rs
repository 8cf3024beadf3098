//! Async HTTP client for the randomuser.me-style JSON API.

use std::time::Duration;

use reqwest::Client;
use roster_core::payload::RemotePage;

use crate::{FetchRequest, RemoteError, RemoteSource, Result};

/// Connection settings for the remote source.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  pub base_url: String,
  /// Whole-request timeout; surfaces as [`RemoteError::Transport`].
  pub timeout:  Duration,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      base_url: "https://randomuser.me".into(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async HTTP client for the identity generator.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RandomUserClient {
  client: Client,
  config: RemoteConfig,
}

impl RandomUserClient {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  pub fn endpoint(&self) -> String {
    format!("{}/api/", self.config.base_url.trim_end_matches('/'))
  }
}

impl RemoteSource for RandomUserClient {
  /// `GET {base_url}/api/?results=<n>&format=json[&nat=..][&gender=..][&seed=..]`
  async fn fetch(&self, request: &FetchRequest) -> Result<RemotePage> {
    request.validate()?;

    let resp = self
      .client
      .get(self.endpoint())
      .query(&request.query_pairs())
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%status, "remote source rejected request");
      return Err(RemoteError::Status { status: status.as_u16(), body });
    }

    let bytes = resp.bytes().await?;
    let page: RemotePage = serde_json::from_slice(&bytes)?;
    tracing::debug!(requested = request.count, received = page.results.len(), "fetched page");
    Ok(page)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoint_tolerates_trailing_slash() {
    let client = RandomUserClient::new(RemoteConfig {
      base_url: "https://randomuser.me/".into(),
      ..RemoteConfig::default()
    })
    .unwrap();
    assert_eq!(client.endpoint(), "https://randomuser.me/api/");
  }

  #[tokio::test]
  async fn zero_count_fails_before_any_request() {
    // Port 9 (discard) is never contacted: validation fails first.
    let client = RandomUserClient::new(RemoteConfig {
      base_url: "http://127.0.0.1:9".into(),
      ..RemoteConfig::default()
    })
    .unwrap();
    let err = client.fetch(&FetchRequest::new(0)).await.unwrap_err();
    assert!(matches!(err, RemoteError::InvalidRequest(_)));
  }

  #[tokio::test]
  async fn unreachable_host_is_a_transport_error() {
    let client = RandomUserClient::new(RemoteConfig {
      base_url: "http://127.0.0.1:9".into(),
      timeout:  Duration::from_secs(2),
    })
    .unwrap();
    let err = client.fetch(&FetchRequest::new(1)).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
    assert!(matches!(roster_core::Error::from(err), roster_core::Error::Remote(_)));
  }
}
