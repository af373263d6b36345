use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Assign the next business number for `prefix`, e.g. `CASE-000042`.
///
/// The counter lives in the store and is advanced with a single
/// upsert statement, so two submissions never receive the same number.
pub fn next_business_number(conn: &Connection, prefix: &str) -> Result<String, DatabaseError> {
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "invalid number prefix: {prefix:?}"
        )));
    }
    let value: i64 = conn.query_row(
        "INSERT INTO number_sequences (prefix, last_value) VALUES (?1, 1)
         ON CONFLICT(prefix) DO UPDATE SET last_value = last_value + 1
         RETURNING last_value",
        params![prefix],
        |row| row.get(0),
    )?;
    Ok(format!("{prefix}-{value:06}"))
}
