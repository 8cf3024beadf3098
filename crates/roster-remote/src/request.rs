//! Request parameters understood by the random-identity generator.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{RemoteError, Result};

/// Response encoding. Only JSON is decoded by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
  #[default]
  Json,
}

impl Format {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Json => "json",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Gender {
  type Err = RemoteError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "male" => Ok(Self::Male),
      "female" => Ok(Self::Female),
      other => Err(RemoteError::InvalidRequest(format!("unknown gender: {other:?}"))),
    }
  }
}

/// One call's worth of parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
  /// Number of identities requested; at least 1.
  pub count:       u32,
  pub format:      Format,
  /// Nationality code such as `"us"` or `"de"`.
  pub nationality: Option<String>,
  pub gender:      Option<Gender>,
  /// Seed for reproducible pages.
  pub seed:        Option<String>,
}

impl FetchRequest {
  pub fn new(count: u32) -> Self {
    Self {
      count,
      format: Format::default(),
      nationality: None,
      gender: None,
      seed: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.count == 0 {
      return Err(RemoteError::InvalidRequest("count must be at least 1".into()));
    }
    Ok(())
  }

  /// Query-string pairs; absent or blank filters are omitted.
  pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
      ("results", self.count.to_string()),
      ("format", self.format.as_str().to_owned()),
    ];

    if let Some(nat) = self.nationality.as_deref().map(str::trim)
      && !nat.is_empty()
    {
      pairs.push(("nat", nat.to_owned()));
    }
    if let Some(gender) = self.gender {
      pairs.push(("gender", gender.as_str().to_owned()));
    }
    if let Some(seed) = self.seed.as_deref().map(str::trim)
      && !seed.is_empty()
    {
      pairs.push(("seed", seed.to_owned()));
    }
    pairs
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_query() {
    assert_eq!(
      FetchRequest::new(10).query_pairs(),
      vec![("results", "10".to_owned()), ("format", "json".to_owned())]
    );
  }

  #[test]
  fn filters_are_appended() {
    let req = FetchRequest {
      nationality: Some("de".into()),
      gender: Some(Gender::Female),
      seed: Some("roster".into()),
      ..FetchRequest::new(3)
    };
    let pairs = req.query_pairs();
    assert!(pairs.contains(&("nat", "de".to_owned())));
    assert!(pairs.contains(&("gender", "female".to_owned())));
    assert!(pairs.contains(&("seed", "roster".to_owned())));
  }

  #[test]
  fn blank_filters_are_dropped() {
    let req = FetchRequest { nationality: Some("  ".into()), ..FetchRequest::new(1) };
    assert_eq!(req.query_pairs().len(), 2);
  }

  #[test]
  fn zero_count_is_rejected() {
    assert!(FetchRequest::new(0).validate().is_err());
    assert!(FetchRequest::new(1).validate().is_ok());
  }

  #[test]
  fn gender_parses_case_insensitively() {
    assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
    assert!("other".parse::<Gender>().is_err());
  }
}
