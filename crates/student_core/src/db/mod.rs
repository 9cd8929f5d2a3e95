//! SQLite connection bootstrap and schema initialization.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the student store.
//! - Create the `students` table before any data access.
//!
//! # Invariants
//! - Core code must not read/write student data before `init_schema` succeeds.
//! - There is no migration registry; the schema is created idempotently.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_with_config};
pub use schema::{init_schema, table_exists, STUDENTS_TABLE};

pub type DbResult<T> = Result<T, DbError>;

/// Connection-level failure: the store cannot be reached or used.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedDriver(String),
    /// The connection was already released by `close`.
    Closed,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedDriver(driver) => {
                write!(f, "unsupported database driver `{driver}`; expected sqlite")
            }
            Self::Closed => write!(f, "database connection is closed"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedDriver(_) | Self::Closed => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
