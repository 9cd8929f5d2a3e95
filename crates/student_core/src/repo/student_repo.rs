//! Student repository contract and SQLite store implementation.
//!
//! # Responsibility
//! - Provide CRUD and name search over the `students` table.
//! - Own the store connection and release it exactly once.
//! - Translate SQLite failures into the store error taxonomy.
//!
//! # Invariants
//! - Every statement is parameterized; input is never spliced into SQL text.
//! - Format rules are not re-checked here; only schema constraints apply.
//! - "No such row" is `None`/`false`, never an error.
//! - Store methods never log; callers decide how to report failures.

use crate::config::StoreConfig;
use crate::db::{init_schema, open_db_in_memory, open_with_config, DbError};
use crate::model::student::{Student, StudentId};
use rusqlite::{ffi, params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    age,
    course,
    created_at
FROM students";

const STUDENT_ORDER_SQL: &str = "ORDER BY name COLLATE NOCASE ASC, id ASC";

const LIKE_ESCAPE: char = '\\';

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surfaced by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Store cannot be reached, opened, or was already closed.
    ConnectionFailure(DbError),
    /// Another row already uses this email.
    DuplicateKey { email: String },
    /// Value rejected by a schema-level CHECK/NOT NULL/size backstop.
    ConstraintViolation(String),
    Db(rusqlite::Error),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailure(err) => write!(f, "database connection failure: {err}"),
            Self::DuplicateKey { email } => {
                write!(f, "duplicate entry: email `{email}` already exists")
            }
            Self::ConstraintViolation(message) => {
                write!(f, "value rejected by database constraint: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConnectionFailure(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey { .. } | Self::ConstraintViolation(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::ConnectionFailure(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        classify_sqlite_error(value, None)
    }
}

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Inserts a new row and returns the record with `id`/`created_at` set.
    fn create(&self, student: &Student) -> StoreResult<Student>;
    fn get_by_id(&self, id: StudentId) -> StoreResult<Option<Student>>;
    /// All rows ordered by name, ties broken by id.
    fn get_all(&self) -> StoreResult<Vec<Student>>;
    /// Case-insensitive substring match on name; empty fragment matches all.
    fn search_by_name(&self, fragment: &str) -> StoreResult<Vec<Student>>;
    /// Overwrites the user fields of `student.id`; `false` when no such row.
    fn update(&self, student: &Student) -> StoreResult<bool>;
    /// Permanently removes the row; `false` when no such row.
    fn delete(&self, id: StudentId) -> StoreResult<bool>;
    fn count(&self) -> StoreResult<u64>;
    /// Releases the connection. Safe to call more than once.
    fn close(&mut self) -> StoreResult<()>;
}

/// SQLite-backed student store owning a single connection.
///
/// Not internally synchronized: concurrent callers should each open their
/// own store.
pub struct SqliteStudentStore {
    conn: Option<Connection>,
}

impl SqliteStudentStore {
    /// Opens the connection described by `config` and initializes the schema.
    ///
    /// Any failure here is reported as `StoreError::ConnectionFailure`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let conn = open_with_config(config)?;
        Ok(Self { conn: Some(conn) })
    }

    /// Opens a private in-memory store, mostly for tests and demos.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self { conn: Some(conn) })
    }

    /// Wraps an already open connection, creating the schema when missing.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self { conn: Some(conn) })
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or(StoreError::ConnectionFailure(DbError::Closed))
    }

    fn query_students(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<Student>> {
        let mut stmt = self.conn()?.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

impl StudentRepository for SqliteStudentStore {
    fn create(&self, student: &Student) -> StoreResult<Student> {
        let (id, created_at) = self
            .conn()?
            .query_row(
                "INSERT INTO students (name, email, age, course)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, created_at;",
                params![
                    student.name.as_str(),
                    student.email.as_str(),
                    student.age,
                    student.course.as_str(),
                ],
                |row| Ok((row.get::<_, StudentId>(0)?, row.get::<_, i64>(1)?)),
            )
            .map_err(|err| classify_sqlite_error(err, Some(student.email.as_str())))?;

        Ok(Student {
            id,
            created_at: Some(created_at),
            ..student.clone()
        })
    }

    fn get_by_id(&self, id: StudentId) -> StoreResult<Option<Student>> {
        let mut stmt = self
            .conn()?
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn get_all(&self) -> StoreResult<Vec<Student>> {
        self.query_students(&format!("{STUDENT_SELECT_SQL} {STUDENT_ORDER_SQL};"), [])
    }

    fn search_by_name(&self, fragment: &str) -> StoreResult<Vec<Student>> {
        self.query_students(
            &format!(
                "{STUDENT_SELECT_SQL}
                 WHERE name LIKE ?1 ESCAPE '{LIKE_ESCAPE}'
                 {STUDENT_ORDER_SQL};"
            ),
            [contains_pattern(fragment)],
        )
    }

    fn update(&self, student: &Student) -> StoreResult<bool> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE students
                 SET
                    name = ?1,
                    email = ?2,
                    age = ?3,
                    course = ?4
                 WHERE id = ?5;",
                params![
                    student.name.as_str(),
                    student.email.as_str(),
                    student.age,
                    student.course.as_str(),
                    student.id,
                ],
            )
            .map_err(|err| classify_sqlite_error(err, Some(student.email.as_str())))?;

        Ok(changed > 0)
    }

    fn delete(&self, id: StudentId) -> StoreResult<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
    }

    fn close(&mut self) -> StoreResult<()> {
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, err)| StoreError::ConnectionFailure(DbError::Sqlite(err))),
            None => Ok(()),
        }
    }
}

fn parse_student_row(row: &Row<'_>) -> StoreResult<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        age: row.get("age")?,
        course: row.get("course")?,
        created_at: row.get("created_at")?,
    })
}

/// Builds a `LIKE` pattern matching `fragment` anywhere, with wildcards
/// in the fragment matched literally.
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Maps SQLite result codes onto the store error taxonomy.
///
/// `email` is the value being written, used to report duplicates.
fn classify_sqlite_error(err: rusqlite::Error, email: Option<&str>) -> StoreError {
    let (failure, message) = match err {
        rusqlite::Error::SqliteFailure(failure, message) => (failure, message),
        other => return StoreError::Db(other),
    };
    let constraint_message = || {
        message
            .clone()
            .unwrap_or_else(|| "constraint failed".to_string())
    };

    match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            return StoreError::DuplicateKey {
                email: email.unwrap_or_default().to_string(),
            };
        }
        ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL => {
            return StoreError::ConstraintViolation(constraint_message());
        }
        _ => {}
    }

    match failure.code {
        ErrorCode::ConstraintViolation | ErrorCode::TooBig => {
            StoreError::ConstraintViolation(constraint_message())
        }
        ErrorCode::CannotOpen
        | ErrorCode::NotADatabase
        | ErrorCode::PermissionDenied
        | ErrorCode::AuthorizationForStatementDenied
        | ErrorCode::ReadOnly => StoreError::ConnectionFailure(DbError::Sqlite(
            rusqlite::Error::SqliteFailure(failure, message),
        )),
        _ => StoreError::Db(rusqlite::Error::SqliteFailure(failure, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_sqlite_error, contains_pattern, StoreError};
    use rusqlite::{ffi, ErrorCode};

    fn failure(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error::new(extended_code),
            Some("constraint message".to_string()),
        )
    }

    #[test]
    fn contains_pattern_escapes_like_wildcards() {
        assert_eq!(contains_pattern(""), "%%");
        assert_eq!(contains_pattern("ann"), "%ann%");
        assert_eq!(contains_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn unique_violation_maps_to_duplicate_key() {
        let err = classify_sqlite_error(failure(ffi::SQLITE_CONSTRAINT_UNIQUE), Some("a@b"));
        assert!(matches!(err, StoreError::DuplicateKey { email } if email == "a@b"));
    }

    #[test]
    fn check_violation_maps_to_constraint_violation() {
        let err = classify_sqlite_error(failure(ffi::SQLITE_CONSTRAINT_CHECK), None);
        assert!(matches!(
            err,
            StoreError::ConstraintViolation(message) if message == "constraint message"
        ));
    }

    #[test]
    fn cannot_open_maps_to_connection_failure() {
        let err = classify_sqlite_error(failure(ffi::SQLITE_CANTOPEN), None);
        assert!(matches!(err, StoreError::ConnectionFailure(_)));
    }

    #[test]
    fn unrelated_errors_stay_generic() {
        let err = classify_sqlite_error(rusqlite::Error::QueryReturnedNoRows, None);
        assert!(matches!(err, StoreError::Db(_)));

        let busy = classify_sqlite_error(failure(ffi::SQLITE_BUSY), None);
        assert!(matches!(busy, StoreError::Db(rusqlite::Error::SqliteFailure(inner, _))
            if inner.code == ErrorCode::DatabaseBusy));
    }
}
