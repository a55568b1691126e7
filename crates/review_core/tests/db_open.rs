use review_core::db::{open_db, open_db_in_memory, open_db_with, ConnectionOptions, DbTarget};
use review_core::{CoreConfig, ReviewRepository, SqliteEmployeeRepository, SqliteReviewRepository};
use rusqlite::Connection;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn in_memory_connection_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(foreign_keys(&conn), 1);
}

#[test]
fn options_can_disable_foreign_keys() {
    let options = ConnectionOptions {
        foreign_keys: false,
        busy_timeout: Duration::from_millis(100),
    };
    let conn = open_db_with(&DbTarget::Memory, options).unwrap();
    assert_eq!(foreign_keys(&conn), 0);
}

#[test]
fn file_database_keeps_reviews_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews.db");

    {
        let conn = open_db(&path).unwrap();
        let employees = SqliteEmployeeRepository::new(&conn);
        employees.create_table().unwrap();
        let employee = employees.create("Lee", "Manager").unwrap();
        let mut repo = SqliteReviewRepository::new(&conn, employees);
        repo.create_table().unwrap();
        repo.create(2023, "persisted", employee.id.unwrap()).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let mut repo = SqliteReviewRepository::new(&conn, SqliteEmployeeRepository::new(&conn));
    repo.create_table().unwrap();

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].borrow().summary(), "persisted");

    let found = repo.find_by_id(1).unwrap().unwrap();
    assert!(Rc::ptr_eq(&all[0], &found));
}

#[test]
fn config_opens_file_target() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig {
        db_path: Some(dir.path().join("configured.db")),
        ..CoreConfig::default()
    };

    let conn = config.open_connection().unwrap();
    assert_eq!(foreign_keys(&conn), 1);
    assert!(dir.path().join("configured.db").exists());
}

#[test]
fn config_deserializes_with_defaults() {
    let config: CoreConfig = serde_json::from_value(serde_json::json!({
        "db_path": "/var/lib/reviews.db",
        "foreign_keys": false
    }))
    .unwrap();

    assert_eq!(
        config.db_target(),
        DbTarget::File("/var/lib/reviews.db".into())
    );
    assert!(!config.foreign_keys);
    assert_eq!(config.busy_timeout_ms, CoreConfig::default().busy_timeout_ms);
    assert!(config.validate().is_ok());
}

fn foreign_keys(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap()
}
