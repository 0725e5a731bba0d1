//! Schema introspection for the claims table.
//!
//! The claims column set is discovered at request time, never assumed at
//! compile time. All whitelisting and required-field logic operates over the
//! introspected list, and reserved columns are located by case-insensitive
//! name match so an operator-altered table keeps working.

use serde::Serialize;
use sqlx::{Row, SqliteConnection};

use crate::database::manager::StoreError;
use crate::database::row::quote_identifier;

/// The table this service manages.
pub const CLAIMS_TABLE: &str = "claims";

/// Columns with reserved semantics whose values are always server-computed on
/// create: identity, claim number, status, dates, reporter and department.
pub const SERVER_COLUMNS: &[&str] = &[
    "id",
    "claim_number",
    "status",
    "submission_date",
    "created_at",
    "reporter",
    "department",
];

/// One column of the live claims table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub nullable: bool,
    pub has_default: bool,
    pub is_primary_key: bool,
}

/// Read the ordered column list of `table` from the live store.
pub async fn introspect(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, StoreError> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.try_get("name")?;
        let not_null: i64 = row.try_get("notnull")?;
        let default_value: Option<String> = row.try_get("dflt_value")?;
        let pk: i64 = row.try_get("pk")?;

        columns.push(ColumnInfo {
            name,
            nullable: not_null == 0,
            has_default: default_value.is_some(),
            is_primary_key: pk != 0,
        });
    }
    Ok(columns)
}

/// Locate a column by case-insensitive name.
pub fn find_column<'a>(columns: &'a [ColumnInfo], name: &str) -> Option<&'a ColumnInfo> {
    columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Whether a column name carries reserved, server-computed semantics.
pub fn is_server_column(name: &str) -> bool {
    SERVER_COLUMNS.iter().any(|s| s.eq_ignore_ascii_case(name))
}

/// Columns a client may supply on create: everything except the primary key
/// and the server-computed reserved set.
pub fn create_whitelist(columns: &[ColumnInfo]) -> Vec<&ColumnInfo> {
    columns
        .iter()
        .filter(|c| !c.is_primary_key && !is_server_column(&c.name))
        .collect()
}

/// Columns a client may overwrite on update: everything except the primary
/// key. The reporter column is additionally excluded for non-administrators,
/// which keeps row authorship immutable to its owner.
pub fn update_whitelist(columns: &[ColumnInfo], include_reporter: bool) -> Vec<&ColumnInfo> {
    columns
        .iter()
        .filter(|c| !c.is_primary_key)
        .filter(|c| include_reporter || !c.name.eq_ignore_ascii_case("reporter"))
        .collect()
}

/// Names of columns that must be filled before an insert can succeed:
/// declared NOT NULL, no declared default, not the primary key.
pub fn required_columns(columns: &[ColumnInfo]) -> Vec<&str> {
    columns
        .iter()
        .filter(|c| !c.nullable && !c.has_default && !c.is_primary_key)
        .map(|c| c.name.as_str())
        .collect()
}
