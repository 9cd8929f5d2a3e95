//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Clear the busy handler so a locked database fails the call at once.
//! - Initialize the student schema before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have the `students` table in place.
//! - Credentials from `StoreConfig` are never logged.
//! - `db_open` events are emitted at debug level only; callers own error
//!   reporting.

use super::schema::init_schema;
use super::{DbError, DbResult};
use crate::config::{ConnectionTarget, StoreConfig};
use log::debug;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the connection described by `config`.
///
/// # Errors
/// - `DbError::UnsupportedDriver` when `config.driver` is not a SQLite driver.
/// - `DbError::Sqlite` when the file cannot be opened or bootstrapped.
pub fn open_with_config(config: &StoreConfig) -> DbResult<Connection> {
    if !config.is_supported_driver() {
        debug!(
            "event=db_open module=db status=error error_code=unsupported_driver driver={}",
            config.driver
        );
        return Err(DbError::UnsupportedDriver(config.driver.clone()));
    }

    match config.target() {
        ConnectionTarget::Memory => open_db_in_memory(),
        ConnectionTarget::File(path) => open_db(path),
    }
}

/// Opens a SQLite database file and initializes the student schema.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits debug-level `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_logged("file", || Connection::open(path))
}

/// Opens a private in-memory database and initializes the student schema.
///
/// # Side effects
/// - Emits debug-level `db_open` events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", Connection::open_in_memory)
}

fn open_logged(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    debug!("event=db_open module=db status=start mode={mode}");

    let conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            debug!(
                "event=db_open module=db status=error mode={} duration_ms={} \
                 error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            debug!(
                "event=db_open module=db status=error mode={} duration_ms={} \
                 error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    // rusqlite installs a 5 s busy handler on open.
    conn.busy_timeout(Duration::ZERO)?;
    init_schema(conn)?;
    Ok(())
}
