//! Named projections over the store and the statistics derived from them.
//!
//! Every ordering ends with the record identifier as a tie-breaker, so two
//! evaluations over the same rows always agree.

use serde::{Deserialize, Serialize};

use crate::{
  record::Record,
  store::{ChangeScope, StoreChange},
};

// ─── Projection ──────────────────────────────────────────────────────────────

/// A named, ordered (and possibly filtered) view of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "arg", rename_all = "snake_case")]
pub enum Projection {
  /// All records, `created_at` descending.
  #[default]
  Newest,
  /// All records, first name then last name ascending.
  ByName,
  /// All records, lexicographic on the stored birth-date display string.
  ByBirthDate,
  /// All records by month then day of birth, ignoring the year. Unknown
  /// months sort last.
  ByBirthdayInYear,
  /// All records by the year in the last four characters of the birth-date
  /// string, most recent year (youngest) first.
  ByAge,
  /// Records with the given `is_manual` flag, `created_at` descending.
  ByProvenance(bool),
  /// Case-insensitive substring match on first or last name, ordered by
  /// first name then last name.
  Search(String),
}

impl Projection {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Newest => "newest",
      Self::ByName => "by_name",
      Self::ByBirthDate => "by_birth_date",
      Self::ByBirthdayInYear => "by_birthday_in_year",
      Self::ByAge => "by_age",
      Self::ByProvenance(true) => "manual_only",
      Self::ByProvenance(false) => "remote_only",
      Self::Search(_) => "search",
    }
  }

  /// Whether `change` could alter this projection's result.
  pub fn is_affected_by(&self, change: &StoreChange) -> bool {
    match (self, change.scope) {
      (Self::ByProvenance(flag), ChangeScope::Provenance(changed)) => *flag == changed,
      _ => true,
    }
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
  #[default]
  Newest,
  Name,
  BirthDate,
  BirthdayInYear,
  Age,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilter {
  #[default]
  All,
  Remote,
  Manual,
}

/// What a list consumer has asked to see: a sort order, a provenance filter
/// and a search term, combined into one [`Projection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSelection {
  pub sort:   SortOrder,
  pub filter: SourceFilter,
  pub search: String,
}

impl ViewSelection {
  /// A non-blank search wins over the filter, which wins over the sort.
  pub fn projection(&self) -> Projection {
    let term = self.search.trim();
    if !term.is_empty() {
      return Projection::Search(term.to_owned());
    }
    match self.filter {
      SourceFilter::Remote => return Projection::ByProvenance(false),
      SourceFilter::Manual => return Projection::ByProvenance(true),
      SourceFilter::All => {}
    }
    match self.sort {
      SortOrder::Newest => Projection::Newest,
      SortOrder::Name => Projection::ByName,
      SortOrder::BirthDate => Projection::ByBirthDate,
      SortOrder::BirthdayInYear => Projection::ByBirthdayInYear,
      SortOrder::Age => Projection::ByAge,
    }
  }
}

// ─── Birth-date helpers ──────────────────────────────────────────────────────

const MONTHS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month of a `"MMM dd, yyyy"` string as 1..=12, or 13 when unrecognised.
pub fn birth_month_index(date_of_birth: &str) -> u8 {
  date_of_birth
    .get(..3)
    .and_then(|prefix| MONTHS.iter().position(|m| *m == prefix))
    .map_or(13, |i| i as u8 + 1)
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Aggregate snapshot over the full record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
  pub total:     usize,
  pub remote:    usize,
  pub manual:    usize,
  /// Distinct non-blank countries, sorted.
  pub countries: Vec<String>,
  /// Distinct non-blank genders, sorted.
  pub genders:   Vec<String>,
}

impl Statistics {
  pub fn from_records(records: &[Record]) -> Self {
    let manual = records.iter().filter(|r| r.is_manual).count();

    let distinct = |field: fn(&Record) -> &str| {
      let mut values: Vec<String> = records
        .iter()
        .map(field)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
        .collect();
      values.sort();
      values.dedup();
      values
    };

    Self {
      total: records.len(),
      remote: records.len() - manual,
      manual,
      countries: distinct(|r| r.country.as_str()),
      genders: distinct(|r| r.gender.as_str()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::ChangeKind;

  fn record(id: &str, country: &str, gender: &str, is_manual: bool) -> Record {
    Record {
      id: id.into(),
      first_name: "A".into(),
      last_name: "B".into(),
      email: String::new(),
      phone: String::new(),
      date_of_birth: String::new(),
      picture_url: String::new(),
      gender: gender.into(),
      country: country.into(),
      city: String::new(),
      street: String::new(),
      is_manual,
      lookup_key: format!("RECORDTAG:{id}"),
      created_at: 0,
      updated_at: 0,
    }
  }

  #[test]
  fn month_index() {
    assert_eq!(birth_month_index("Jan 05, 1990"), 1);
    assert_eq!(birth_month_index("Dec 20, 1985"), 12);
    assert_eq!(birth_month_index("1990-01-05"), 13);
    assert_eq!(birth_month_index(""), 13);
  }

  #[test]
  fn search_overrides_filter_and_sort() {
    let mut sel = ViewSelection {
      sort:   SortOrder::Age,
      filter: SourceFilter::Manual,
      search: "  an ".into(),
    };
    assert_eq!(sel.projection(), Projection::Search("an".into()));

    sel.search = "   ".into();
    assert_eq!(sel.projection(), Projection::ByProvenance(true));

    sel.filter = SourceFilter::All;
    assert_eq!(sel.projection(), Projection::ByAge);

    assert_eq!(ViewSelection::default().projection(), Projection::Newest);
  }

  #[test]
  fn provenance_projection_ignores_other_slice() {
    let manual_only = Projection::ByProvenance(true);
    let remote_change =
      StoreChange::new(ChangeKind::Inserted, ChangeScope::Provenance(false), 1);
    let wide_change = StoreChange::new(ChangeKind::Cleared, ChangeScope::All, 2);

    assert!(!manual_only.is_affected_by(&remote_change));
    assert!(manual_only.is_affected_by(&wide_change));
    assert!(Projection::ByName.is_affected_by(&remote_change));
  }

  #[test]
  fn statistics_counts_and_distinct_lists() {
    let stats = Statistics::from_records(&[
      record("1", "Spain", "Male", false),
      record("2", "Canada", "Female", true),
      record("3", "Spain", "Female", false),
      record("4", "", "", true),
    ]);

    assert_eq!(stats.total, 4);
    assert_eq!(stats.remote, 2);
    assert_eq!(stats.manual, 2);
    assert_eq!(stats.countries, ["Canada", "Spain"]);
    assert_eq!(stats.genders, ["Female", "Male"]);
  }
}
