use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;

pub const DB_FILE_NAME: &str = "database.sqlite";

const BUSY_TIMEOUT_ENV: &str = "ARCHIVE_BUSY_TIMEOUT_MS";
const BATCH_ROWS_ENV: &str = "ARCHIVE_BATCH_ROWS";

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BATCH_ROWS: usize = 500;
// messages has 11 columns; keeps one statement under SQLite's 32766 parameter cap.
pub(crate) const MAX_BATCH_ROWS: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub busy_timeout: Duration,
    /// Rows bound into a single multi-row INSERT.
    pub batch_rows: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

impl ArchiveConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(BUSY_TIMEOUT_ENV) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                CoreError::InvalidArgument(format!("{} must be an integer", BUSY_TIMEOUT_ENV))
            })?;
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Ok(raw) = std::env::var(BATCH_ROWS_ENV) {
            let rows: usize = raw.trim().parse().map_err(|_| {
                CoreError::InvalidArgument(format!("{} must be an integer", BATCH_ROWS_ENV))
            })?;
            config.batch_rows = rows;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.batch_rows == 0 || self.batch_rows > MAX_BATCH_ROWS {
            return Err(CoreError::InvalidArgument(format!(
                "batch_rows must be between 1 and {}",
                MAX_BATCH_ROWS
            )));
        }
        Ok(())
    }
}

/// Location of the archive inside a per-account backup directory.
pub fn archive_path(file_base: impl AsRef<Path>) -> PathBuf {
    file_base.as_ref().join(DB_FILE_NAME)
}
