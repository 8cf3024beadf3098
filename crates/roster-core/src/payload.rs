//! Wire types for the random-identity source's JSON response.
//!
//! Only the fields the mapper reads are required; everything else defaults so
//! a schema drift on the remote side degrades into empty strings instead of a
//! failed import. Unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One page of generated identities plus request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePage {
  pub results: Vec<RemoteIdentity>,
  #[serde(default)]
  pub info:    Option<PageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
  #[serde(default)]
  pub seed:    String,
  #[serde(default)]
  pub results: u32,
  #[serde(default)]
  pub page:    u32,
  #[serde(default)]
  pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIdentity {
  #[serde(default)]
  pub gender:   String,
  pub name:     RemoteName,
  #[serde(default)]
  pub location: RemoteLocation,
  #[serde(default)]
  pub email:    String,
  pub login:    RemoteLogin,
  #[serde(default)]
  pub dob:      RemoteDob,
  #[serde(default)]
  pub phone:    String,
  #[serde(default)]
  pub cell:     String,
  #[serde(default)]
  pub picture:  RemotePicture,
  #[serde(default)]
  pub nat:      String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteName {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub first: String,
  #[serde(default)]
  pub last:  String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteLocation {
  #[serde(default)]
  pub street:   RemoteStreet,
  #[serde(default)]
  pub city:     String,
  #[serde(default)]
  pub state:    String,
  #[serde(default)]
  pub country:  String,
  #[serde(default)]
  pub postcode: Postcode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteStreet {
  #[serde(default)]
  pub number: i64,
  #[serde(default)]
  pub name:   String,
}

impl RemoteStreet {
  /// `"{number} {name}"`, as the source renders it.
  pub fn full_street(&self) -> String { format!("{} {}", self.number, self.name) }
}

/// The source emits postcodes as strings for some nationalities and as
/// integers for others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Postcode {
  Text(String),
  Number(i64),
}

impl Default for Postcode {
  fn default() -> Self { Self::Text(String::new()) }
}

impl fmt::Display for Postcode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(s) => f.write_str(s),
      Self::Number(n) => write!(f, "{n}"),
    }
  }
}

/// Login block; `uuid` is the source's unique identity and becomes the
/// record identifier verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLogin {
  pub uuid:     String,
  #[serde(default)]
  pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteDob {
  /// ISO-8601 instant, e.g. `1990-01-05T10:20:30.000Z`.
  #[serde(default)]
  pub date: String,
  #[serde(default)]
  pub age:  u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemotePicture {
  #[serde(default)]
  pub large:     String,
  #[serde(default)]
  pub medium:    String,
  #[serde(default)]
  pub thumbnail: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"{
    "results": [{
      "gender": "female",
      "name": { "title": "Ms", "first": "anna", "last": "miller" },
      "location": {
        "street": { "number": 12, "name": "main street" },
        "city": "springfield",
        "state": "oregon",
        "country": "united states",
        "postcode": 97477,
        "coordinates": { "latitude": "0", "longitude": "0" }
      },
      "email": "anna.miller@example.com",
      "login": { "uuid": "c1a4c0de-1111-4222-8333-944455556666", "username": "bluefish" },
      "dob": { "date": "1990-01-05T10:20:30.000Z", "age": 34 },
      "phone": "(555) 010-0101",
      "cell": "(555) 010-0102",
      "picture": { "large": "https://example.com/l.jpg", "medium": "", "thumbnail": "" },
      "nat": "US"
    }],
    "info": { "seed": "abc", "results": 1, "page": 1, "version": "1.4" }
  }"#;

  #[test]
  fn decodes_source_response() {
    let page: RemotePage = serde_json::from_str(SAMPLE).unwrap();
    assert_eq!(page.results.len(), 1);

    let who = &page.results[0];
    assert_eq!(who.login.uuid, "c1a4c0de-1111-4222-8333-944455556666");
    assert_eq!(who.location.street.full_street(), "12 main street");
    assert_eq!(who.location.postcode, Postcode::Number(97477));
    assert_eq!(page.info.unwrap().seed, "abc");
  }

  #[test]
  fn textual_postcode_decodes() {
    let loc: RemoteLocation =
      serde_json::from_str(r#"{ "postcode": "EC1A 1BB" }"#).unwrap();
    assert_eq!(loc.postcode.to_string(), "EC1A 1BB");
  }
}
