//! Plain-text rendering of records, snapshots and statistics.

use std::fmt::Write as _;

use chrono::DateTime;
use roster_core::{
  projection::Statistics,
  record::{Provenance, Record},
};
use roster_sync::Snapshot;

fn origin(record: &Record) -> &'static str {
  match record.provenance() {
    Provenance::Remote => "remote",
    Provenance::Manual => "manual",
  }
}

fn timestamp(millis: i64) -> String {
  DateTime::from_timestamp_millis(millis)
    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    .unwrap_or_else(|| millis.to_string())
}

/// One line per record.
pub fn row(record: &Record) -> String {
  format!(
    "{:<14} {:<28} {:<34} {:<13} {}",
    record.short_tag(),
    record.full_name(),
    record.email,
    record.date_of_birth,
    origin(record),
  )
}

pub fn snapshot(snapshot: &Snapshot) -> String {
  let mut out = format!(
    "── {} (rev {}, {} records)\n",
    snapshot.projection.name(),
    snapshot.revision,
    snapshot.records.len()
  );
  for record in &snapshot.records {
    out.push_str(&row(record));
    out.push('\n');
  }
  out
}

pub fn detail(record: &Record) -> String {
  let fields = [
    ("id", record.id.clone()),
    ("tag", record.short_tag()),
    ("lookup key", record.lookup_key.clone()),
    ("name", record.full_name()),
    ("email", record.email.clone()),
    ("phone", record.phone.clone()),
    ("born", record.date_of_birth.clone()),
    ("gender", record.gender.clone()),
    ("address", record.full_address()),
    ("picture", record.picture_url.clone()),
    ("origin", origin(record).to_owned()),
    ("created", timestamp(record.created_at)),
    ("updated", timestamp(record.updated_at)),
  ];

  let mut out = String::new();
  for (label, value) in fields {
    writeln!(out, "{label:>10}: {value}").ok();
  }
  out
}

pub fn statistics(stats: &Statistics) -> String {
  format!(
    "total: {}  remote: {}  manual: {}\ncountries: {}\ngenders: {}\n",
    stats.total,
    stats.remote,
    stats.manual,
    stats.countries.join(", "),
    stats.genders.join(", "),
  )
}
