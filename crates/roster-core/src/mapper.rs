//! Record construction from remote payloads and from manual input.
//!
//! This is the only place that normalises text, generates identifiers and
//! derives lookup keys. Both paths stamp `created_at` and `updated_at` with
//! the caller-supplied `now` (epoch milliseconds).

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  payload::RemoteIdentity,
  record::Record,
  scan::SCAN_PREFIX,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("valid email regex")
});

/// Output format for stored birth dates.
const BIRTH_DATE_FORMAT: &str = "%b %d, %Y";

// ─── Text helpers ────────────────────────────────────────────────────────────

/// Lower-case every space-separated word, then upper-case its first
/// character. Runs of spaces are preserved.
pub fn title_case(input: &str) -> String {
  input
    .split(' ')
    .map(|word| {
      let lower = word.to_lowercase();
      let mut chars = lower.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Render the source's ISO-8601 birth instant as `"MMM dd, yyyy"`.
///
/// Unparseable input falls back to whatever precedes the first `T`, so a
/// bare `1990-01-05` survives as-is instead of failing the import.
pub fn format_birth_date(iso: &str) -> String {
  let iso = iso.trim();

  let parsed = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.fZ")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(iso).ok().map(|dt| dt.naive_utc()));

  match parsed {
    Some(dt) => dt.format(BIRTH_DATE_FORMAT).to_string(),
    None => iso.split('T').next().unwrap_or_default().to_owned(),
  }
}

/// The scan token stored alongside a record.
pub fn lookup_key_for(id: &str) -> String { format!("{SCAN_PREFIX}{id}") }

/// `local@domain.tld` with at least one dot in the domain.
pub fn is_valid_email(email: &str) -> bool { EMAIL_RE.is_match(email) }

// ─── Remote path ─────────────────────────────────────────────────────────────

/// Map one remote identity into a [`Record`].
///
/// Fails only when the payload carries no login identifier, since the record
/// would then have no stable identity.
pub fn map_remote(identity: &RemoteIdentity, now: i64) -> Result<Record> {
  let id = identity.login.uuid.trim();
  if id.is_empty() {
    return Err(Error::Validation(
      "remote identity has an empty login uuid".into(),
    ));
  }

  Ok(Record {
    id:            id.to_owned(),
    first_name:    title_case(&identity.name.first),
    last_name:     title_case(&identity.name.last),
    email:         identity.email.clone(),
    phone:         identity.phone.clone(),
    date_of_birth: format_birth_date(&identity.dob.date),
    picture_url:   identity.picture.large.clone(),
    gender:        title_case(&identity.gender),
    country:       title_case(&identity.location.country),
    city:          title_case(&identity.location.city),
    street:        title_case(&identity.location.street.full_street()),
    is_manual:     false,
    lookup_key:    lookup_key_for(id),
    created_at:    now,
    updated_at:    now,
  })
}

/// Map a whole page, rejecting it entirely if any identity is unusable.
pub fn map_remote_batch(
  identities: &[RemoteIdentity],
  now: i64,
) -> Result<Vec<Record>> {
  identities.iter().map(|i| map_remote(i, now)).collect()
}

// ─── Manual path ─────────────────────────────────────────────────────────────

/// User-supplied fields for a hand-entered record. Everything except first
/// name, last name and email is optional and may stay empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualInput {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  #[serde(default)]
  pub phone:         String,
  #[serde(default)]
  pub date_of_birth: String,
  #[serde(default)]
  pub picture_url:   String,
  #[serde(default)]
  pub gender:        String,
  #[serde(default)]
  pub country:       String,
  #[serde(default)]
  pub city:          String,
  #[serde(default)]
  pub street:        String,
}

impl ManualInput {
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    email: impl Into<String>,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      email: email.into(),
      ..Self::default()
    }
  }

  /// Check the required fields and the email grammar.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("first name", &self.first_name),
      ("last name", &self.last_name),
      ("email", &self.email),
    ];
    for (label, value) in required {
      if value.trim().is_empty() {
        return Err(Error::Validation(format!("{label} is required")));
      }
    }

    if !is_valid_email(self.email.trim()) {
      return Err(Error::Validation(format!(
        "invalid email address: {:?}",
        self.email.trim()
      )));
    }
    Ok(())
  }
}

/// Validate `input` and build a manual [`Record`] with a fresh identifier.
pub fn build_manual(input: &ManualInput, now: i64) -> Result<Record> {
  input.validate()?;

  let id = Uuid::new_v4().to_string();
  let mut record = Record {
    lookup_key:    lookup_key_for(&id),
    id,
    first_name:    String::new(),
    last_name:     String::new(),
    email:         String::new(),
    phone:         String::new(),
    date_of_birth: String::new(),
    picture_url:   String::new(),
    gender:        String::new(),
    country:       String::new(),
    city:          String::new(),
    street:        String::new(),
    is_manual:     true,
    created_at:    now,
    updated_at:    now,
  };
  write_fields(&mut record, input);
  Ok(record)
}

/// Validate `input` and apply it to a copy of `existing`.
///
/// Identity, provenance, lookup key and `created_at` are carried over
/// untouched; the store refreshes `updated_at` when the edit is persisted.
pub fn apply_edit(existing: &Record, input: &ManualInput) -> Result<Record> {
  input.validate()?;

  let mut record = existing.clone();
  write_fields(&mut record, input);
  Ok(record)
}

fn write_fields(record: &mut Record, input: &ManualInput) {
  record.first_name = title_case(input.first_name.trim());
  record.last_name = title_case(input.last_name.trim());
  record.email = input.email.trim().to_owned();
  record.phone = input.phone.trim().to_owned();
  record.date_of_birth = input.date_of_birth.trim().to_owned();
  record.picture_url = input.picture_url.trim().to_owned();
  record.gender = title_case(input.gender.trim());
  record.country = title_case(input.country.trim());
  record.city = title_case(input.city.trim());
  record.street = title_case(input.street.trim());
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::payload::{
    RemoteDob, RemoteLocation, RemoteLogin, RemoteName, RemotePicture,
    RemoteStreet,
  };

  fn identity(uuid: &str) -> RemoteIdentity {
    RemoteIdentity {
      gender:   "female".into(),
      name:     RemoteName {
        title: "Ms".into(),
        first: "aNNa".into(),
        last:  "van der berg".into(),
      },
      location: RemoteLocation {
        street: RemoteStreet { number: 7, name: "old mill road".into() },
        city: "cork".into(),
        country: "ireland".into(),
        ..RemoteLocation::default()
      },
      email:    "anna@example.com".into(),
      login:    RemoteLogin { uuid: uuid.into(), username: "anna".into() },
      dob:      RemoteDob { date: "1990-01-05T10:20:30.000Z".into(), age: 34 },
      phone:    "021-555".into(),
      cell:     String::new(),
      picture:  RemotePicture {
        large: "https://example.com/a.jpg".into(),
        ..RemotePicture::default()
      },
      nat:      "IE".into(),
    }
  }

  #[test]
  fn title_case_words() {
    assert_eq!(title_case("van der BERG"), "Van Der Berg");
    assert_eq!(title_case("  two  spaces"), "  Two  Spaces");
    assert_eq!(title_case(""), "");
    assert_eq!(title_case("élodie"), "Élodie");
  }

  #[test]
  fn birth_date_is_formatted() {
    assert_eq!(format_birth_date("1990-01-05T10:20:30.000Z"), "Jan 05, 1990");
    assert_eq!(format_birth_date("1985-12-20T00:00:00Z"), "Dec 20, 1985");
  }

  #[test]
  fn birth_date_falls_back_to_date_part() {
    assert_eq!(format_birth_date("1990-13-45T99:00"), "1990-13-45");
    assert_eq!(format_birth_date("sometime"), "sometime");
    assert_eq!(format_birth_date(""), "");
  }

  #[test]
  fn email_grammar() {
    assert!(is_valid_email("a@b.com"));
    assert!(is_valid_email("first.last+tag@mail.example.org"));
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("a@localhost"));
    assert!(!is_valid_email("a@b."));
    assert!(!is_valid_email("a b@c.de"));
  }

  #[test]
  fn remote_mapping_keeps_source_identity() {
    let r = map_remote(&identity("c1a4-uuid"), 42).unwrap();
    assert_eq!(r.id, "c1a4-uuid");
    assert_eq!(r.lookup_key, "RECORDTAG:c1a4-uuid");
    assert_eq!(r.first_name, "Anna");
    assert_eq!(r.last_name, "Van Der Berg");
    assert_eq!(r.street, "7 Old Mill Road");
    assert_eq!(r.city, "Cork");
    assert_eq!(r.country, "Ireland");
    assert_eq!(r.gender, "Female");
    assert_eq!(r.date_of_birth, "Jan 05, 1990");
    assert_eq!(r.picture_url, "https://example.com/a.jpg");
    assert!(!r.is_manual);
    assert_eq!((r.created_at, r.updated_at), (42, 42));
  }

  #[test]
  fn batch_with_blank_uuid_is_rejected_whole() {
    let batch = [identity("a"), identity("  "), identity("c")];
    let err = map_remote_batch(&batch, 0).unwrap_err();
    assert!(err.is_validation());
  }

  #[test]
  fn manual_requires_names_and_email() {
    let err = build_manual(&ManualInput::new("", "Lee", "a@b.com"), 0).unwrap_err();
    assert!(err.is_validation());

    let err = build_manual(&ManualInput::new("Ann", "  ", "a@b.com"), 0).unwrap_err();
    assert!(err.is_validation());

    let err =
      build_manual(&ManualInput::new("Ann", "Lee", "not-an-email"), 0).unwrap_err();
    assert!(err.is_validation());
  }

  #[test]
  fn manual_record_is_fresh_and_flagged() {
    let mut input = ManualInput::new("ann", "lee", " ann@lee.io ");
    input.country = "new zealand".into();

    let a = build_manual(&input, 7).unwrap();
    let b = build_manual(&input, 7).unwrap();

    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
    assert!(a.is_manual);
    assert_eq!(a.lookup_key, format!("RECORDTAG:{}", a.id));
    assert_eq!(a.full_name(), "Ann Lee");
    assert_eq!(a.email, "ann@lee.io");
    assert_eq!(a.country, "New Zealand");
    assert_eq!(a.phone, "");
  }

  #[test]
  fn edit_keeps_identity_and_provenance() {
    let remote = map_remote(&identity("keep-me"), 5).unwrap();
    let mut input = ManualInput::new("zoe", "quinn", "zoe@quinn.dev");
    input.city = "lyon".into();

    let edited = apply_edit(&remote, &input).unwrap();
    assert_eq!(edited.id, "keep-me");
    assert_eq!(edited.lookup_key, remote.lookup_key);
    assert!(!edited.is_manual);
    assert_eq!(edited.created_at, 5);
    assert_eq!(edited.full_name(), "Zoe Quinn");
    assert_eq!(edited.city, "Lyon");
    assert_eq!(edited.street, "");

    let bad = ManualInput::new("zoe", "quinn", "zoe@");
    assert!(apply_edit(&remote, &bad).unwrap_err().is_validation());
  }
}
