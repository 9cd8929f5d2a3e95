use student_core::db::{
    init_schema, open_db, open_db_in_memory, open_with_config, table_exists, DbError,
    STUDENTS_TABLE,
};
use student_core::StoreConfig;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_students_table() {
    let conn = open_db_in_memory().unwrap();

    assert!(table_exists(&conn, STUDENTS_TABLE).unwrap());
    for column in ["id", "name", "email", "age", "course", "created_at"] {
        assert!(
            column_names(&conn).contains(&column.to_string()),
            "column {column} does not exist"
        );
    }
}

#[test]
fn opening_same_database_twice_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO students (name, email, age, course) VALUES ('Ann Lee', 'ann@x.com', 20, 'CS');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(row_count(&conn_second), 1);
}

#[test]
fn init_schema_is_idempotent() {
    let conn = Connection::open_in_memory().unwrap();

    init_schema(&conn).unwrap();
    init_schema(&conn).unwrap();
    assert!(table_exists(&conn, STUDENTS_TABLE).unwrap());
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn created_at_defaults_to_insertion_time_in_millis() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (name, email, age, course) VALUES ('Ann Lee', 'ann@x.com', 20, 'CS');",
        [],
    )
    .unwrap();

    let created_at: i64 = conn
        .query_row("SELECT created_at FROM students;", [], |row| row.get(0))
        .unwrap();
    // 2001-09-09 in epoch millis; anything smaller would be seconds.
    assert!(created_at > 1_000_000_000_000);
}

#[test]
fn email_uniqueness_is_enforced_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO students (name, email, age, course) VALUES ('Ann Lee', 'ann@x.com', 20, 'CS');";

    conn.execute(insert, []).unwrap();
    assert!(conn.execute(insert, []).is_err());
    assert_eq!(row_count(&conn), 1);
}

#[test]
fn open_with_config_rejects_unknown_driver() {
    let config = StoreConfig {
        driver: "postgres".to_string(),
        ..StoreConfig::in_memory()
    };

    let err = open_with_config(&config).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedDriver(driver) if driver == "postgres"));
}

#[test]
fn open_with_config_opens_file_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.db");
    let config = StoreConfig {
        url: format!("sqlite://{}", path.display()),
        ..StoreConfig::default()
    };

    let conn = open_with_config(&config).unwrap();
    assert!(table_exists(&conn, STUDENTS_TABLE).unwrap());
    assert!(path.exists());
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        .unwrap()
}

fn column_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(students);").unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}
