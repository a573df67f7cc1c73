use chat_archive_core::db::{apply_migrations, current_version};
use chat_archive_core::{open_archive, LATEST_VERSION};
use rusqlite::Connection;
use tempfile::tempdir;

fn columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({});", table))
        .expect("pragma");
    let mut rows = stmt.query([]).expect("rows");
    let mut names = Vec::new();
    while let Some(row) = rows.next().expect("row") {
        names.push(row.get::<_, String>(1).expect("name"));
    }
    names
}

fn schema_sql(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name;")
        .expect("schema");
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("rows");
    rows.map(|r| r.expect("sql")).collect()
}

#[test]
fn people_table_is_renamed_with_phone() {
    let conn = Connection::open_in_memory().expect("memory db");
    apply_migrations(&conn).expect("migrate");
    let cols = columns(&conn, "users");
    for expected in ["id", "first_name", "last_name", "username", "type", "phone"] {
        assert!(cols.iter().any(|c| c == expected), "users.{expected} missing");
    }
    assert!(columns(&conn, "people").is_empty());
}

#[test]
fn messages_table_has_archive_columns() {
    let conn = Connection::open_in_memory().expect("memory db");
    apply_migrations(&conn).expect("migrate");
    let cols = columns(&conn, "messages");
    assert_eq!(
        cols,
        vec![
            "id", "dialog_id", "to_id", "from_id", "from_type", "text", "time", "has_media",
            "sticker", "data", "type"
        ]
    );
}

#[test]
fn every_step_is_recorded_once() {
    let conn = Connection::open_in_memory().expect("memory db");
    apply_migrations(&conn).expect("migrate");
    let versions: Vec<i64> = {
        let mut stmt = conn
            .prepare("SELECT version FROM database_versions ORDER BY version;")
            .expect("stmt");
        let rows = stmt.query_map([], |row| row.get(0)).expect("rows");
        rows.map(|r| r.expect("version")).collect()
    };
    assert_eq!(versions, (1..=LATEST_VERSION).collect::<Vec<_>>());
}

#[test]
fn reapplying_is_a_no_op() {
    let conn = Connection::open_in_memory().expect("memory db");
    let first = apply_migrations(&conn).expect("migrate");
    let schema = schema_sql(&conn);
    let second = apply_migrations(&conn).expect("migrate again");
    assert_eq!(first, second);
    assert_eq!(schema, schema_sql(&conn));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM database_versions;", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, LATEST_VERSION);
}

#[test]
fn reopening_a_file_store_keeps_version_and_schema() {
    let tmp = tempdir().expect("temp");
    let path = tmp.path().join("database.sqlite");
    let schema = {
        let archive = open_archive(&path).expect("first open");
        schema_sql(&archive.conn)
    };
    let archive = open_archive(&path).expect("second open");
    assert_eq!(current_version(&archive.conn).expect("version"), LATEST_VERSION);
    assert_eq!(schema, schema_sql(&archive.conn));
}

#[test]
fn version_one_store_is_upgraded_without_data_loss() {
    let conn = Connection::open_in_memory().expect("memory db");
    conn.execute_batch(
        r#"
        CREATE TABLE messages (id INTEGER PRIMARY KEY ASC, dialog_id INTEGER, to_id INTEGER,
          from_id INTEGER, from_type TEXT, text TEXT, time TEXT, has_media BOOLEAN,
          sticker TEXT, data BLOB, type TEXT);
        CREATE TABLE dialogs (id INTEGER PRIMARY KEY ASC, name TEXT, type TEXT);
        CREATE TABLE people (id INTEGER PRIMARY KEY ASC, first_name TEXT, last_name TEXT,
          username TEXT, type TEXT);
        CREATE TABLE database_versions (version INTEGER);
        INSERT INTO database_versions (version) VALUES (1);
        INSERT INTO people (id, first_name, last_name, username, type)
          VALUES (7, 'Grace', 'Hopper', 'grace', 'user');
        INSERT INTO messages (id, dialog_id, text, type) VALUES (1, 7, 'kept', 'message');
        "#,
    )
    .expect("v1 store");
    assert_eq!(current_version(&conn).expect("version"), 1);

    apply_migrations(&conn).expect("upgrade");

    let (first_name, phone): (String, Option<String>) = conn
        .query_row(
            "SELECT first_name, phone FROM users WHERE id = 7;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("user");
    assert_eq!(first_name, "Grace");
    assert_eq!(phone, None);
    let text: String = conn
        .query_row("SELECT text FROM messages WHERE id = 1;", [], |row| row.get(0))
        .expect("message");
    assert_eq!(text, "kept");
}
