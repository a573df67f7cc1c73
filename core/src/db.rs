use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::info;

use crate::config::ArchiveConfig;
use crate::error::CoreError;
use crate::migrations::MIGRATIONS;
use crate::runs;
use crate::writer::BatchWriter;

pub struct ArchiveDb {
    pub path: PathBuf,
    pub conn: Connection,
    pub config: ArchiveConfig,
}

impl ArchiveDb {
    pub fn writer(&mut self) -> BatchWriter<'_> {
        let batch_rows = self.config.batch_rows;
        BatchWriter::new(&mut self.conn).with_batch_rows(batch_rows)
    }
}

pub fn open_archive(path: impl AsRef<Path>) -> Result<ArchiveDb, CoreError> {
    open_archive_with(path, &ArchiveConfig::default())
}

pub fn open_archive_with(
    path: impl AsRef<Path>,
    config: &ArchiveConfig,
) -> Result<ArchiveDb, CoreError> {
    config.validate()?;
    let path = path.as_ref().to_path_buf();
    let conn = Connection::open(&path)?;
    conn.busy_timeout(config.busy_timeout)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL; \
         PRAGMA synchronous = NORMAL; \
         PRAGMA temp_store = MEMORY;",
    )?;
    apply_migrations(&conn)?;
    runs::mark_interrupted(&conn)?;
    info!(path = %path.display(), "archive opened");
    Ok(ArchiveDb {
        path,
        conn,
        config: config.clone(),
    })
}

/// Version of the last fully applied step, 0 for a store that has never been migrated.
pub fn current_version(conn: &Connection) -> Result<i64, CoreError> {
    let tracked: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='database_versions';",
        [],
        |row| row.get(0),
    )?;
    if tracked == 0 {
        return Ok(0);
    }
    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM database_versions;", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

/// Brings the schema up to date and returns the resulting version.
///
/// Every step runs in its own transaction together with the row recording its
/// version, so a failed step leaves the store at the previous version. The
/// error is fatal for the caller: the archive must not be used afterwards.
pub fn apply_migrations(conn: &Connection) -> Result<i64, CoreError> {
    let mut version = current_version(conn)?;
    info!("Database version: {}", version);
    for (idx, sql) in MIGRATIONS.iter().enumerate() {
        let next_version = idx as i64 + 1;
        if next_version <= version {
            continue;
        }
        info!("Updating to version {}...", next_version);
        apply_step(conn, sql, next_version).map_err(|source| CoreError::Migration {
            version: next_version,
            source,
        })?;
        version = next_version;
    }
    info!(version, "Database is ready.");
    Ok(version)
}

fn apply_step(conn: &Connection, sql: &str, version: i64) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO database_versions (version) VALUES (?1);",
        params![version],
    )?;
    tx.commit()
}
