//! Student table definition and idempotent initialization.
//!
//! # Invariants
//! - `init_schema` may run on every startup; existing rows are untouched.
//! - `email` uniqueness and the `age` range are enforced by SQLite itself.

use super::DbResult;
use rusqlite::Connection;

pub const STUDENTS_TABLE: &str = "students";

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the `students` table and its name index when missing.
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Returns whether `table` exists in the connected database.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
