use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{BackupRun, RunStatus};
use crate::query::top_message_id;

/// Records the start of a backup run and returns its id.
pub fn begin_run(conn: &Connection) -> Result<String, CoreError> {
    let run_id = Uuid::new_v4().to_string();
    let top_id = top_message_id(conn);
    conn.execute(
        "INSERT INTO backup_runs (id, started_at, finished_at, status, top_message_id, stats_json)
         VALUES (?1, ?2, NULL, ?3, ?4, NULL);",
        params![
            run_id,
            Utc::now().timestamp_millis(),
            RunStatus::Running.as_str(),
            top_id
        ],
    )?;
    info!(run_id = %run_id, top_id, "backup run started");
    Ok(run_id)
}

pub fn finish_run(
    conn: &Connection,
    run_id: &str,
    stats: &serde_json::Value,
) -> Result<(), CoreError> {
    close_run(conn, run_id, RunStatus::Success, stats.to_string())
}

pub fn fail_run(conn: &Connection, run_id: &str, error: &str) -> Result<(), CoreError> {
    let stats = serde_json::json!({ "error": error }).to_string();
    close_run(conn, run_id, RunStatus::Failed, stats)
}

fn close_run(
    conn: &Connection,
    run_id: &str,
    status: RunStatus,
    stats_json: String,
) -> Result<(), CoreError> {
    let updated = conn.execute(
        "UPDATE backup_runs SET status = ?2, finished_at = ?3, stats_json = ?4
         WHERE id = ?1 AND status = 'running';",
        params![run_id, status.as_str(), Utc::now().timestamp_millis(), stats_json],
    )?;
    if updated == 0 {
        return Err(CoreError::InvalidArgument(format!(
            "no running backup run with id {}",
            run_id
        )));
    }
    Ok(())
}

/// Runs still marked running belong to a process that stopped mid-backup.
pub(crate) fn mark_interrupted(conn: &Connection) -> Result<usize, CoreError> {
    let updated = conn.execute(
        "UPDATE backup_runs
         SET status = 'interrupted',
             stats_json = COALESCE(stats_json, '{\"error\":\"backup interrupted\"}')
         WHERE status = 'running';",
        [],
    )?;
    if updated > 0 {
        warn!(runs = updated, "previous backup run was interrupted");
    }
    Ok(updated)
}

pub fn last_run(conn: &Connection) -> Result<Option<BackupRun>, CoreError> {
    let row = conn
        .query_row(
            "SELECT id, started_at, finished_at, status, top_message_id, stats_json
             FROM backup_runs
             ORDER BY started_at DESC, rowid DESC
             LIMIT 1;",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;
    let Some((id, started_at, finished_at, status, top_message_id, stats_json)) = row else {
        return Ok(None);
    };
    let status = RunStatus::parse(&status)
        .ok_or_else(|| CoreError::unexpected("stored run status", status))?;
    Ok(Some(BackupRun {
        id,
        started_at,
        finished_at,
        status,
        top_message_id,
        stats_json,
    }))
}
