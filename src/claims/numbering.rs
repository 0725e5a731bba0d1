//! Sequential claim-number generation.
//!
//! Numbers follow `NZG-<year>-<seq>` with the sequence unique and increasing
//! within a year. The next value is derived by scanning the existing numbers
//! for the year and taking max+1; the scan and the subsequent insert are two
//! separate statements, so two concurrent creates can observe the same
//! maximum (see DESIGN.md).

use sqlx::SqliteConnection;

use crate::database::manager::StoreError;

pub const CLAIM_NUMBER_PREFIX: &str = "NZG";

/// Compute the next claim number for `year` from the live claim set.
pub async fn next_claim_number(
    conn: &mut SqliteConnection,
    year: i32,
) -> Result<String, StoreError> {
    let prefix = format!("{}-{}-", CLAIM_NUMBER_PREFIX, year);
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT claim_number FROM claims WHERE claim_number LIKE ?")
            .bind(format!("{}%", prefix))
            .fetch_all(&mut *conn)
            .await?;

    let max = existing.iter().map(|n| numeric_suffix(n)).max().unwrap_or(0);
    Ok(format_claim_number(year, max + 1))
}

/// Numeric suffix of a claim number; absent or non-numeric suffixes count as 0.
pub fn numeric_suffix(claim_number: &str) -> u32 {
    claim_number
        .rsplit('-')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Format a claim number, zero-padding the sequence to a minimum width of 3.
pub fn format_claim_number(year: i32, seq: u32) -> String {
    format!("{}-{}-{:03}", CLAIM_NUMBER_PREFIX, year, seq)
}
