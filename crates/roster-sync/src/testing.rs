//! Scripted remote source and payload builders shared by the unit tests.

use std::{
  collections::VecDeque,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use roster_core::payload::{RemoteIdentity, RemotePage};
use roster_remote::{FetchRequest, RemoteError, RemoteSource, Result};
use serde_json::json;

enum Scripted {
  Page(RemotePage),
  Status(u16),
}

/// Replays queued responses in order; fails once the queue is drained.
#[derive(Default)]
pub struct FakeSource {
  script: Mutex<VecDeque<Scripted>>,
  calls:  AtomicUsize,
  last:   Mutex<Option<FetchRequest>>,
}

impl FakeSource {
  pub fn new() -> Self { Self::default() }

  pub fn with_page(self, page: RemotePage) -> Self {
    self.script.lock().unwrap().push_back(Scripted::Page(page));
    self
  }

  pub fn with_failure(self, status: u16) -> Self {
    self.script.lock().unwrap().push_back(Scripted::Status(status));
    self
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  pub fn last_request(&self) -> Option<FetchRequest> { self.last.lock().unwrap().clone() }
}

impl RemoteSource for FakeSource {
  async fn fetch(&self, request: &FetchRequest) -> Result<RemotePage> {
    request.validate()?;
    self.calls.fetch_add(1, Ordering::SeqCst);
    *self.last.lock().unwrap() = Some(request.clone());

    let next = self.script.lock().unwrap().pop_front();
    match next {
      Some(Scripted::Page(page)) => Ok(page),
      Some(Scripted::Status(status)) => {
        Err(RemoteError::Status { status, body: "scripted failure".into() })
      }
      None => Err(RemoteError::Status { status: 503, body: "script exhausted".into() }),
    }
  }
}

/// A source-shaped identity with the given login uuid and names.
pub fn identity(uuid: &str, first: &str, last: &str) -> RemoteIdentity {
  serde_json::from_value(json!({
    "gender": "female",
    "name": { "title": "Ms", "first": first, "last": last },
    "location": {
      "street": { "number": 7, "name": "elm street" },
      "city": "springfield",
      "state": "oregon",
      "country": "united states",
      "postcode": 97477
    },
    "email": format!("{first}.{last}@example.com"),
    "login": { "uuid": uuid, "username": first },
    "dob": { "date": "1990-01-05T10:20:30.000Z", "age": 34 },
    "phone": "(555) 010-0101",
    "picture": { "large": "https://example.com/l.jpg" },
    "nat": "US"
  }))
  .unwrap()
}

pub fn page(identities: &[RemoteIdentity]) -> RemotePage {
  RemotePage { results: identities.to_vec(), info: None }
}
