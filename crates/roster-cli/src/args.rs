//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use roster_core::{
  mapper::ManualInput,
  projection::{SortOrder, SourceFilter, ViewSelection},
};
use roster_remote::Gender;

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Offline-first personal records store")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml", value_name = "FILE")]
  pub config: PathBuf,

  /// SQLite file to use instead of `store_path` from the configuration.
  #[arg(long, value_name = "FILE")]
  pub store: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Fetch generated identities from the remote source.
  Import {
    /// Number of records; defaults to `import.default_batch`.
    count: Option<u32>,

    /// Nationality code, e.g. `us` or `de`.
    #[arg(long)]
    nat: Option<String>,

    #[arg(long)]
    gender: Option<Gender>,

    /// Seed for a reproducible page.
    #[arg(long)]
    seed: Option<String>,
  },

  /// Create a record by hand.
  Add(RecordFields),

  /// Replace the editable fields of an existing record.
  Edit {
    id: String,
    #[command(flatten)]
    fields: RecordFields,
  },

  /// Print one evaluation of a view.
  List(ViewArgs),

  /// Print a view and reprint it whenever the store changes. Ctrl-C exits.
  Watch(ViewArgs),

  /// Show every field of one record.
  Show { id: String },

  /// Resolve a scanned `RECORDTAG:` token.
  Scan { token: String },

  /// Counts plus distinct countries and genders.
  Stats {
    /// Keep printing as the store changes.
    #[arg(long)]
    watch: bool,
  },

  /// Delete one record.
  Delete { id: String },

  /// Delete every record, or only one provenance.
  Clear {
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    only: FilterArg,
  },
}

#[derive(Args, Debug)]
pub struct RecordFields {
  #[arg(long)]
  pub first:   String,
  #[arg(long)]
  pub last:    String,
  #[arg(long)]
  pub email:   String,
  #[arg(long, default_value = "")]
  pub phone:   String,
  /// Free text, conventionally `MMM dd, yyyy`.
  #[arg(long, default_value = "")]
  pub dob:     String,
  #[arg(long, default_value = "")]
  pub picture: String,
  #[arg(long, default_value = "")]
  pub gender:  String,
  #[arg(long, default_value = "")]
  pub country: String,
  #[arg(long, default_value = "")]
  pub city:    String,
  #[arg(long, default_value = "")]
  pub street:  String,
}

impl From<RecordFields> for ManualInput {
  fn from(f: RecordFields) -> Self {
    Self {
      first_name:    f.first,
      last_name:     f.last,
      email:         f.email,
      phone:         f.phone,
      date_of_birth: f.dob,
      picture_url:   f.picture,
      gender:        f.gender,
      country:       f.country,
      city:          f.city,
      street:        f.street,
    }
  }
}

#[derive(Args, Debug)]
pub struct ViewArgs {
  #[arg(long, value_enum, default_value_t = SortArg::Newest)]
  pub sort:   SortArg,
  #[arg(long, value_enum, default_value_t = FilterArg::All)]
  pub filter: FilterArg,
  /// Case-insensitive substring of the first or last name. Overrides
  /// `--filter` and `--sort`.
  #[arg(long)]
  pub search: Option<String>,
}

impl From<ViewArgs> for ViewSelection {
  fn from(v: ViewArgs) -> Self {
    Self {
      sort:   v.sort.into(),
      filter: v.filter.into(),
      search: v.search.unwrap_or_default(),
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortArg {
  Newest,
  Name,
  BirthDate,
  Birthday,
  Age,
}

impl From<SortArg> for SortOrder {
  fn from(s: SortArg) -> Self {
    match s {
      SortArg::Newest => Self::Newest,
      SortArg::Name => Self::Name,
      SortArg::BirthDate => Self::BirthDate,
      SortArg::Birthday => Self::BirthdayInYear,
      SortArg::Age => Self::Age,
    }
  }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterArg {
  All,
  Remote,
  Manual,
}

impl From<FilterArg> for SourceFilter {
  fn from(f: FilterArg) -> Self {
    match f {
      FilterArg::All => Self::All,
      FilterArg::Remote => Self::Remote,
      FilterArg::Manual => Self::Manual,
    }
  }
}
