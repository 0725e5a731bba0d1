//! The claims CRUD engine.
//!
//! Orchestrates schema introspection, access control, claim numbering and
//! enrichment to serve list/create/update/delete over the dynamically-shaped
//! claims table. Handlers stay thin; all column handling lives here and
//! operates on the introspected column list, never on a fixed struct.

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use crate::claims::access;
use crate::claims::enrichment::{self, UserDirectory};
use crate::claims::numbering;
use crate::database::row::{bind_value, quote_identifier, row_to_map};
use crate::database::schema::{self, ColumnInfo, CLAIMS_TABLE};
use crate::error::ApiError;
use crate::session::AuthUser;

/// Synthetic row-identity field attached to every returned row.
pub const ROW_ID_FIELD: &str = "rowId";

/// Status given to every newly created claim.
pub const DEFAULT_STATUS: &str = "Nowe";

/// Table-scoped engine over a single request's store connection.
pub struct ClaimsEngine<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ClaimsEngine<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Column metadata of the live claims table.
    pub async fn schema(&mut self) -> Result<Vec<ColumnInfo>, ApiError> {
        Ok(schema::introspect(&mut *self.conn, CLAIMS_TABLE).await?)
    }

    /// All rows visible to `user`: everything for administrators, only
    /// self-authored rows for everyone else. Each row is tagged with its
    /// identity and enriched with a department where one is missing.
    pub async fn list(&mut self, user: &AuthUser) -> Result<Vec<Map<String, Value>>, ApiError> {
        let columns = schema::introspect(&mut *self.conn, CLAIMS_TABLE).await?;
        let reporter_col = schema::find_column(&columns, "reporter").map(|c| c.name.clone());
        let department_col = schema::find_column(&columns, "department").map(|c| c.name.clone());

        let mut rows = match (&reporter_col, user.is_admin()) {
            (Some(col), false) => {
                let sql = format!(
                    "SELECT rowid AS \"{}\", * FROM {} WHERE {} = ?",
                    ROW_ID_FIELD,
                    quote_identifier(CLAIMS_TABLE),
                    quote_identifier(col)
                );
                let fetched = sqlx::query(&sql)
                    .bind(&user.full_name)
                    .fetch_all(&mut *self.conn)
                    .await?;
                fetched.iter().map(row_to_map).collect::<Vec<_>>()
            }
            _ => {
                let sql = format!(
                    "SELECT rowid AS \"{}\", * FROM {}",
                    ROW_ID_FIELD,
                    quote_identifier(CLAIMS_TABLE)
                );
                let fetched = sqlx::query(&sql).fetch_all(&mut *self.conn).await?;
                fetched.iter().map(row_to_map).collect::<Vec<_>>()
            }
        };

        // A table without a department column gets no synthetic one
        if let Some(department_col) = &department_col {
            let directory = UserDirectory::load(&mut *self.conn).await?;
            enrichment::enrich_rows(&mut rows, reporter_col.as_deref(), department_col, &directory);
        }
        Ok(rows)
    }

    /// Insert a new claim. Reserved columns are always server-computed and
    /// client-supplied values for them are discarded; the remaining client
    /// fields are filtered to the introspected whitelist.
    pub async fn create(
        &mut self,
        user: &AuthUser,
        input: Map<String, Value>,
    ) -> Result<Map<String, Value>, ApiError> {
        let columns = schema::introspect(&mut *self.conn, CLAIMS_TABLE).await?;
        let now = Utc::now();

        let mut fields = Map::new();
        if let Some(col) = schema::find_column(&columns, "claim_number") {
            let number = numbering::next_claim_number(&mut *self.conn, now.year()).await?;
            fields.insert(col.name.clone(), Value::String(number));
        }
        if let Some(col) = schema::find_column(&columns, "status") {
            fields.insert(col.name.clone(), Value::String(DEFAULT_STATUS.to_string()));
        }
        if let Some(col) = schema::find_column(&columns, "submission_date") {
            fields.insert(col.name.clone(), Value::String(now.format("%Y-%m-%d").to_string()));
        }
        if let Some(col) = schema::find_column(&columns, "created_at") {
            fields.insert(col.name.clone(), Value::String(now.to_rfc3339()));
        }
        if let Some(col) = schema::find_column(&columns, "reporter") {
            fields.insert(col.name.clone(), Value::String(user.full_name.clone()));
        }
        if let Some(col) = schema::find_column(&columns, "department") {
            fields.insert(col.name.clone(), Value::String(user.department.clone()));
        }

        let whitelist = schema::create_whitelist(&columns);
        for (key, value) in input {
            if let Some(col) = whitelist.iter().find(|c| c.name.eq_ignore_ascii_case(&key)) {
                fields.insert(col.name.clone(), value);
            }
        }

        if fields.is_empty() {
            return Err(ApiError::bad_request("No fields provided"));
        }

        let missing: Vec<String> = schema::required_columns(&columns)
            .into_iter()
            .filter(|name| !matches!(fields.get(*name), Some(v) if !v.is_null()))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::missing_required_fields(missing));
        }

        let column_list: Vec<String> = fields.keys().map(|k| quote_identifier(k)).collect();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(CLAIMS_TABLE),
            column_list.join(", "),
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = bind_value(query, value);
        }
        let result = query.execute(&mut *self.conn).await?;
        let row_id = result.last_insert_rowid();

        self.fetch_row(row_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Claim not found"))
    }

    /// Overwrite the provided columns of an existing claim. Unknown keys are
    /// dropped silently; an empty effective set is rejected.
    pub async fn update(
        &mut self,
        user: &AuthUser,
        row_id: i64,
        input: Map<String, Value>,
    ) -> Result<Map<String, Value>, ApiError> {
        let columns = schema::introspect(&mut *self.conn, CLAIMS_TABLE).await?;
        let reporter_col = schema::find_column(&columns, "reporter").map(|c| c.name.clone());

        let row = self
            .fetch_row(row_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Claim not found"))?;
        access::ensure_can_modify(&row, user, reporter_col.as_deref())?;

        let whitelist = schema::update_whitelist(&columns, user.is_admin());
        let mut fields = Map::new();
        for (key, value) in input {
            if let Some(col) = whitelist.iter().find(|c| c.name.eq_ignore_ascii_case(&key)) {
                fields.insert(col.name.clone(), value);
            }
        }
        if fields.is_empty() {
            return Err(ApiError::bad_request("No fields provided"));
        }

        let assignments: Vec<String> =
            fields.keys().map(|k| format!("{} = ?", quote_identifier(k))).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE rowid = ?",
            quote_identifier(CLAIMS_TABLE),
            assignments.join(", ")
        );
        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = bind_value(query, value);
        }
        let result = query.bind(row_id).execute(&mut *self.conn).await?;
        if result.rows_affected() == 0 {
            // The row can vanish between the access check and the write
            return Err(ApiError::not_found("Claim not found"));
        }

        self.fetch_row(row_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Claim not found"))
    }

    /// Remove a claim by identity, returning the identity removed.
    pub async fn delete(&mut self, user: &AuthUser, row_id: i64) -> Result<i64, ApiError> {
        let columns = schema::introspect(&mut *self.conn, CLAIMS_TABLE).await?;
        let reporter_col = schema::find_column(&columns, "reporter").map(|c| c.name.clone());

        let row = self
            .fetch_row(row_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Claim not found"))?;
        access::ensure_can_modify(&row, user, reporter_col.as_deref())?;

        let sql = format!("DELETE FROM {} WHERE rowid = ?", quote_identifier(CLAIMS_TABLE));
        let result = sqlx::query(&sql).bind(row_id).execute(&mut *self.conn).await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Claim not found"));
        }
        Ok(row_id)
    }

    /// Canonical current shape of a single row, tagged with its identity.
    async fn fetch_row(&mut self, row_id: i64) -> Result<Option<Map<String, Value>>, ApiError> {
        let sql = format!(
            "SELECT rowid AS \"{}\", * FROM {} WHERE rowid = ?",
            ROW_ID_FIELD,
            quote_identifier(CLAIMS_TABLE)
        );
        let row = sqlx::query(&sql).bind(row_id).fetch_optional(&mut *self.conn).await?;
        Ok(row.as_ref().map(row_to_map))
    }
}
