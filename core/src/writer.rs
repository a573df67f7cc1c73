use rusqlite::types::Value;
use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::config::{ArchiveConfig, MAX_BATCH_ROWS};
use crate::error::CoreError;
use crate::models::{DialogRecord, MessageRecord, Normalized, UpsertPolicy, UserRecord, WriteStats};
use crate::normalize::Normalizer;
use crate::protocol::{Chat, Message, User};
use crate::sticker::StickerNamer;

/// A row type that maps onto one archive table.
pub(crate) trait TableRow {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn push_values(&self, out: &mut Vec<Value>);
}

impl TableRow for MessageRecord {
    const TABLE: &'static str = "messages";
    const COLUMNS: &'static [&'static str] = &[
        "id", "dialog_id", "to_id", "from_id", "from_type", "text", "time", "has_media", "sticker",
        "data", "type",
    ];

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id));
        out.push(opt(self.dialog_id));
        out.push(opt(self.to_id));
        out.push(opt(self.from_id));
        out.push(opt(self.from_type.map(|k| k.as_str().to_string())));
        out.push(opt(self.text.clone()));
        out.push(opt(self.time.clone()));
        out.push(opt(self.has_media));
        out.push(opt(self.sticker.clone()));
        out.push(opt(self.data.clone()));
        out.push(Value::from(self.kind.as_str().to_string()));
    }
}

impl TableRow for DialogRecord {
    const TABLE: &'static str = "dialogs";
    const COLUMNS: &'static [&'static str] = &["id", "name", "type"];

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id));
        out.push(opt(self.name.clone()));
        out.push(Value::from(self.kind.as_str().to_string()));
    }
}

impl TableRow for UserRecord {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "first_name", "last_name", "username", "phone", "type"];

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::from(self.id));
        out.push(opt(self.first_name.clone()));
        out.push(opt(self.last_name.clone()));
        out.push(opt(self.username.clone()));
        out.push(opt(self.phone.clone()));
        out.push(Value::from(self.kind.as_str().to_string()));
    }
}

fn opt<T: Into<Value>>(value: Option<T>) -> Value {
    match value {
        Some(v) => v.into(),
        None => Value::Null,
    }
}

/// Applies normalized rows to the archive, one transaction per call.
///
/// Each batch is normalized completely before the transaction opens, so an
/// unexpected variant aborts the call without touching the store. Inside the
/// transaction the `Replace` rows are written first, then the `Ignore` rows.
/// Any error drops the transaction, which rolls back every row of the call.
pub struct BatchWriter<'c> {
    conn: &'c mut Connection,
    batch_rows: usize,
}

impl<'c> BatchWriter<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self {
            conn,
            batch_rows: ArchiveConfig::default().batch_rows,
        }
    }

    /// Rows per statement, clamped so one statement stays under SQLite's bind limit.
    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows.clamp(1, MAX_BATCH_ROWS);
        self
    }

    pub fn save_messages<N: StickerNamer>(
        &mut self,
        normalizer: &Normalizer<N>,
        messages: &[Message],
    ) -> Result<WriteStats, CoreError> {
        let rows = messages
            .iter()
            .map(|msg| normalizer.message(msg))
            .collect::<Result<Vec<_>, _>>()?;
        self.write(rows)
    }

    pub fn save_dialogs<N: StickerNamer>(
        &mut self,
        normalizer: &Normalizer<N>,
        chats: &[Chat],
    ) -> Result<WriteStats, CoreError> {
        let rows = chats
            .iter()
            .map(|chat| normalizer.dialog(chat))
            .collect::<Result<Vec<_>, _>>()?;
        self.write(rows)
    }

    pub fn save_users<N: StickerNamer>(
        &mut self,
        normalizer: &Normalizer<N>,
        users: &[User],
    ) -> Result<WriteStats, CoreError> {
        let rows = users
            .iter()
            .map(|user| normalizer.user(user))
            .collect::<Result<Vec<_>, _>>()?;
        self.write(rows)
    }

    fn write<R: TableRow>(&mut self, rows: Vec<Normalized<R>>) -> Result<WriteStats, CoreError> {
        let (replace, ignore): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|row| row.policy == UpsertPolicy::Replace);
        let mut stats = WriteStats {
            replaced: replace.len(),
            ignored: ignore.len(),
            written: 0,
        };
        if replace.is_empty() && ignore.is_empty() {
            return Ok(stats);
        }

        let tx = self.conn.transaction()?;
        stats.written += insert_batch(&tx, UpsertPolicy::Replace, &replace, self.batch_rows)?;
        stats.written += insert_batch(&tx, UpsertPolicy::Ignore, &ignore, self.batch_rows)?;
        tx.commit()?;

        debug!(
            table = R::TABLE,
            replaced = stats.replaced,
            ignored = stats.ignored,
            written = stats.written,
            "batch committed"
        );
        Ok(stats)
    }
}

fn insert_batch<R: TableRow>(
    tx: &Transaction,
    policy: UpsertPolicy,
    rows: &[Normalized<R>],
    batch_rows: usize,
) -> Result<usize, CoreError> {
    let mut changes = 0;
    for chunk in rows.chunks(batch_rows) {
        let placeholders = format!("({})", vec!["?"; R::COLUMNS.len()].join(", "));
        let mut sql = format!(
            "{} INTO {} ({}) VALUES ",
            policy.insert_verb(),
            R::TABLE,
            R::COLUMNS.join(", ")
        );
        let mut params_vec: Vec<Value> = Vec::with_capacity(chunk.len() * R::COLUMNS.len());
        for (idx, row) in chunk.iter().enumerate() {
            if idx > 0 {
                sql.push(',');
            }
            sql.push_str(&placeholders);
            row.row.push_values(&mut params_vec);
        }
        changes += tx.execute(&sql, rusqlite::params_from_iter(params_vec))?;
    }
    Ok(changes)
}
