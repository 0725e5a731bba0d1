//! Department enrichment for listed claims.
//!
//! Rows that carry no department are filled from a directory keyed by the
//! reporter's composed full name. The join is best-effort and in-memory,
//! computed per list request and never written back. The lookup sits behind a
//! trait so the exact-string name match can later give way to a keyed join.

use std::collections::HashMap;

use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use crate::database::manager::StoreError;
use crate::users;

pub trait DepartmentLookup {
    fn department_for(&self, full_name: &str) -> Option<String>;
}

/// Directory built from a full scan of the user set, keyed by full name.
pub struct UserDirectory {
    by_full_name: HashMap<String, String>,
}

impl UserDirectory {
    pub async fn load(conn: &mut SqliteConnection) -> Result<Self, StoreError> {
        let users = users::all(conn).await?;
        let by_full_name = users
            .iter()
            .map(|u| (u.full_name(), u.department.clone()))
            .collect();
        Ok(Self { by_full_name })
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            by_full_name: pairs
                .iter()
                .map(|(name, dept)| (name.to_string(), dept.to_string()))
                .collect(),
        }
    }
}

impl DepartmentLookup for UserDirectory {
    fn department_for(&self, full_name: &str) -> Option<String> {
        self.by_full_name.get(full_name).cloned()
    }
}

/// Fill the department of every row that lacks one. Non-empty values are left
/// untouched; unmatched reporters get an empty string.
pub fn enrich_rows(
    rows: &mut [Map<String, Value>],
    reporter_key: Option<&str>,
    department_key: &str,
    lookup: &dyn DepartmentLookup,
) {
    for row in rows.iter_mut() {
        let current = row.get(department_key).and_then(|v| v.as_str()).unwrap_or("");
        if !current.is_empty() {
            continue;
        }

        let department = reporter_key
            .and_then(|key| row.get(key))
            .and_then(|v| v.as_str())
            .and_then(|name| lookup.department_for(name))
            .unwrap_or_default();

        row.insert(department_key.to_string(), Value::String(department));
    }
}
