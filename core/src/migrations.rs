/// Schema steps; the step at index `i` brings the archive to version `i + 1`.
/// The version row itself is written by `db::apply_migrations`.
pub const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS messages (
      id INTEGER PRIMARY KEY ASC,
      dialog_id INTEGER,
      to_id INTEGER,
      from_id INTEGER,
      from_type TEXT,
      text TEXT,
      time TEXT,
      has_media BOOLEAN,
      sticker TEXT,
      data BLOB,
      type TEXT
    );

    CREATE TABLE IF NOT EXISTS dialogs (
      id INTEGER PRIMARY KEY ASC,
      name TEXT,
      type TEXT
    );

    CREATE TABLE IF NOT EXISTS people (
      id INTEGER PRIMARY KEY ASC,
      first_name TEXT,
      last_name TEXT,
      username TEXT,
      type TEXT
    );

    CREATE TABLE IF NOT EXISTS database_versions (
      version INTEGER
    );
    "#,
    r#"
    ALTER TABLE people RENAME TO users;
    ALTER TABLE users ADD COLUMN phone TEXT;
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS backup_runs (
      id TEXT PRIMARY KEY,
      started_at INTEGER NOT NULL,
      finished_at INTEGER,
      status TEXT NOT NULL,
      top_message_id INTEGER NOT NULL DEFAULT 0,
      stats_json TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_backup_runs_started_at
      ON backup_runs(started_at DESC);
    CREATE INDEX IF NOT EXISTS idx_messages_has_media
      ON messages(has_media);
    "#,
];

pub const LATEST_VERSION: i64 = MIGRATIONS.len() as i64;
