//! Row mapping between [`Record`] and the `records` table, plus the SQL for
//! each [`Projection`].
//!
//! Timestamps are stored as integer epoch milliseconds and the provenance
//! flag as `0`/`1`, so every column maps onto a plain SQLite type.

use roster_core::{projection::Projection, record::Record};
use rusqlite::{functions::FunctionFlags, types::Value};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Column list in the order [`read_record`] expects.
pub const COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, \
   picture_url, gender, country, city, street, is_manual, lookup_key, \
   created_at, updated_at";

pub const INSERT_OR_REPLACE: &str = "INSERT OR REPLACE INTO records (
     id, first_name, last_name, email, phone, date_of_birth,
     picture_url, gender, country, city, street, is_manual, lookup_key,
     created_at, updated_at
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

/// Replaces the editable fields only. `?1` is the identifier, `?12` the
/// caller's clock; `updated_at` never moves backwards or stands still.
pub const UPDATE_FIELDS: &str = "UPDATE records SET
     first_name    = ?2,
     last_name     = ?3,
     email         = ?4,
     phone         = ?5,
     date_of_birth = ?6,
     picture_url   = ?7,
     gender        = ?8,
     country       = ?9,
     city          = ?10,
     street        = ?11,
     updated_at    = max(?12, updated_at + 1)
   WHERE id = ?1";

// ─── Record <-> row ──────────────────────────────────────────────────────────

/// Parameters for [`INSERT_OR_REPLACE`].
pub fn insert_params(r: &Record) -> [Value; 15] {
  [
    Value::Text(r.id.clone()),
    Value::Text(r.first_name.clone()),
    Value::Text(r.last_name.clone()),
    Value::Text(r.email.clone()),
    Value::Text(r.phone.clone()),
    Value::Text(r.date_of_birth.clone()),
    Value::Text(r.picture_url.clone()),
    Value::Text(r.gender.clone()),
    Value::Text(r.country.clone()),
    Value::Text(r.city.clone()),
    Value::Text(r.street.clone()),
    Value::Integer(i64::from(r.is_manual)),
    Value::Text(r.lookup_key.clone()),
    Value::Integer(r.created_at),
    Value::Integer(r.updated_at),
  ]
}

/// Parameters for [`UPDATE_FIELDS`].
pub fn update_params(r: &Record, now: i64) -> [Value; 12] {
  [
    Value::Text(r.id.clone()),
    Value::Text(r.first_name.clone()),
    Value::Text(r.last_name.clone()),
    Value::Text(r.email.clone()),
    Value::Text(r.phone.clone()),
    Value::Text(r.date_of_birth.clone()),
    Value::Text(r.picture_url.clone()),
    Value::Text(r.gender.clone()),
    Value::Text(r.country.clone()),
    Value::Text(r.city.clone()),
    Value::Text(r.street.clone()),
    Value::Integer(now),
  ]
}

/// Read a row selected with [`COLUMNS`].
pub fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
  Ok(Record {
    id:            row.get(0)?,
    first_name:    row.get(1)?,
    last_name:     row.get(2)?,
    email:         row.get(3)?,
    phone:         row.get(4)?,
    date_of_birth: row.get(5)?,
    picture_url:   row.get(6)?,
    gender:        row.get(7)?,
    country:       row.get(8)?,
    city:          row.get(9)?,
    street:        row.get(10)?,
    is_manual:     row.get(11)?,
    lookup_key:    row.get(12)?,
    created_at:    row.get(13)?,
    updated_at:    row.get(14)?,
  })
}

// ─── SQL functions ───────────────────────────────────────────────────────────

/// Unicode-aware lower-casing; the built-in `lower()` folds ASCII only.
pub const FOLD_CASE: &str = "fold_case";

/// Register the custom scalar functions the projection SQL relies on.
/// Must run on the connection before any query.
pub fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_CASE,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(fold_case(&ctx.get::<String>(0)?)),
  )
}

/// The folding applied to both the search term and the name columns.
pub fn fold_case(s: &str) -> String { s.to_lowercase() }

// ─── Projections ─────────────────────────────────────────────────────────────

const BIRTH_MONTH: &str = "CASE substr(date_of_birth, 1, 3)
       WHEN 'Jan' THEN 1  WHEN 'Feb' THEN 2  WHEN 'Mar' THEN 3
       WHEN 'Apr' THEN 4  WHEN 'May' THEN 5  WHEN 'Jun' THEN 6
       WHEN 'Jul' THEN 7  WHEN 'Aug' THEN 8  WHEN 'Sep' THEN 9
       WHEN 'Oct' THEN 10 WHEN 'Nov' THEN 11 WHEN 'Dec' THEN 12
       ELSE 13
     END";

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE
/// '\'` pattern.
pub fn escape_like(term: &str) -> String {
  let mut out = String::with_capacity(term.len());
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// SQL and bound parameters evaluating `projection`.
pub fn projection_sql(projection: &Projection) -> (String, Vec<Value>) {
  let (filter, order, params) = match projection {
    Projection::Newest => ("", "created_at DESC, id ASC".to_owned(), vec![]),
    Projection::ByName => {
      ("", "first_name ASC, last_name ASC, id ASC".to_owned(), vec![])
    }
    Projection::ByBirthDate => ("", "date_of_birth ASC, id ASC".to_owned(), vec![]),
    Projection::ByBirthdayInYear => (
      "",
      format!(
        "{BIRTH_MONTH}, CAST(substr(date_of_birth, 5, 2) AS INTEGER) ASC, id ASC"
      ),
      vec![],
    ),
    Projection::ByAge => (
      "",
      "CAST(substr(date_of_birth, -4) AS INTEGER) DESC, id ASC".to_owned(),
      vec![],
    ),
    Projection::ByProvenance(is_manual) => (
      "WHERE is_manual = ?1",
      "created_at DESC, id ASC".to_owned(),
      vec![Value::Integer(i64::from(*is_manual))],
    ),
    Projection::Search(term) => (
      "WHERE fold_case(first_name) LIKE ?1 ESCAPE '\\'
          OR fold_case(last_name)  LIKE ?1 ESCAPE '\\'",
      "first_name ASC, last_name ASC, id ASC".to_owned(),
      vec![Value::Text(format!("%{}%", escape_like(&fold_case(term.trim()))))],
    ),
  };

  let sql = format!("SELECT {COLUMNS} FROM records {filter} ORDER BY {order}");
  (sql, params)
}
