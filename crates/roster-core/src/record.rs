//! Record — the canonical entity describing one person.
//!
//! A record is either imported from the remote identity generator or entered
//! by hand. Identity, provenance, lookup key and `created_at` are fixed when
//! the record is built (see [`crate::mapper`]); only the descriptive fields
//! change afterwards, and only through [`crate::store::RecordStore::update`].

use serde::{Deserialize, Serialize};

// ─── Provenance ──────────────────────────────────────────────────────────────

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
  /// Fetched from the remote random-identity source.
  Remote,
  /// Typed in by the user.
  Manual,
}

impl Provenance {
  pub fn from_is_manual(is_manual: bool) -> Self {
    if is_manual { Self::Manual } else { Self::Remote }
  }

  pub fn is_manual(self) -> bool { matches!(self, Self::Manual) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One stored person.
///
/// Word-based text fields (names, gender, country, city, street) are
/// title-cased once at construction and stored that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  /// Remote login UUID for imported records, a fresh UUID v4 otherwise.
  pub id:            String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub phone:         String,
  /// Display-formatted birth date, usually `"MMM dd, yyyy"`.
  pub date_of_birth: String,
  /// Profile picture URI; may be empty.
  pub picture_url:   String,
  pub gender:        String,
  pub country:       String,
  pub city:          String,
  pub street:        String,
  pub is_manual:     bool,
  /// `"RECORDTAG:" + id`, generated once and stored.
  pub lookup_key:    String,
  /// Epoch milliseconds.
  pub created_at:    i64,
  /// Epoch milliseconds; refreshed on every mutation.
  pub updated_at:    i64,
}

impl Record {
  pub fn provenance(&self) -> Provenance {
    Provenance::from_is_manual(self.is_manual)
  }

  /// `first + " " + last`.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Best-effort postal line, degrading as components go missing.
  pub fn full_address(&self) -> String {
    let street = self.street.trim();
    let city = self.city.trim();
    let country = self.country.trim();

    match (street.is_empty(), city.is_empty(), country.is_empty()) {
      (false, false, false) => format!("{street}, {city}, {country}"),
      (_, false, false) => format!("{city}, {country}"),
      (_, _, false) => country.to_owned(),
      _ => "Address not available".to_owned(),
    }
  }

  /// Short human tag such as `USER_3F2A9C1B`. Display only; never stored.
  pub fn short_tag(&self) -> String {
    let compact: String = self.id.chars().filter(|c| *c != '-').take(8).collect();
    format!("USER_{}", compact.to_uppercase())
  }
}
