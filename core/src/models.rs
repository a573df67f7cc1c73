use serde::{Deserialize, Serialize};

/// How a normalized row is applied to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertPolicy {
    /// Authoritative: overwrites any stored row with the same id.
    Replace,
    /// Placeholder: only fills the id if nothing is stored yet.
    Ignore,
}

impl UpsertPolicy {
    pub(crate) fn insert_verb(self) -> &'static str {
        match self {
            UpsertPolicy::Replace => "INSERT OR REPLACE",
            UpsertPolicy::Ignore => "INSERT OR IGNORE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<R> {
    pub policy: UpsertPolicy,
    pub row: R,
}

impl<R> Normalized<R> {
    pub fn replace(row: R) -> Self {
        Self {
            policy: UpsertPolicy::Replace,
            row,
        }
    }

    pub fn ignore(row: R) -> Self {
        Self {
            policy: UpsertPolicy::Ignore,
            row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerKind {
    Chat,
    Channel,
    User,
}

impl PeerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PeerKind::Chat => "chat",
            PeerKind::Channel => "channel",
            PeerKind::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chat" => Some(PeerKind::Chat),
            "channel" => Some(PeerKind::Channel),
            "user" => Some(PeerKind::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    ServiceMessage,
    EmptyMessage,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::ServiceMessage => "service_message",
            MessageKind::EmptyMessage => "empty_message",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "message" => Some(MessageKind::Message),
            "service_message" => Some(MessageKind::ServiceMessage),
            "empty_message" => Some(MessageKind::EmptyMessage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    Chat,
    Channel,
    EmptyChat,
}

impl DialogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DialogKind::Chat => "chat",
            DialogKind::Channel => "channel",
            DialogKind::EmptyChat => "empty_chat",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chat" => Some(DialogKind::Chat),
            "channel" => Some(DialogKind::Channel),
            "empty_chat" => Some(DialogKind::EmptyChat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    User,
    EmptyUser,
}

impl UserKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UserKind::User => "user",
            UserKind::EmptyUser => "empty_user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserKind::User),
            "empty_user" => Some(UserKind::EmptyUser),
            _ => None,
        }
    }
}

/// One row of the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub dialog_id: Option<i64>,
    pub to_id: Option<i64>,
    pub from_id: Option<i64>,
    pub from_type: Option<PeerKind>,
    pub text: Option<String>,
    pub time: Option<String>,
    pub has_media: Option<bool>,
    pub sticker: Option<String>,
    pub data: Option<Vec<u8>>,
    pub kind: MessageKind,
}

impl MessageRecord {
    /// A row that only records that `id` exists.
    pub fn placeholder(id: i64, kind: MessageKind) -> Self {
        Self {
            id,
            dialog_id: None,
            to_id: None,
            from_id: None,
            from_type: None,
            text: None,
            time: None,
            has_media: None,
            sticker: None,
            data: None,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRecord {
    pub id: i64,
    pub name: Option<String>,
    pub kind: DialogKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub kind: UserKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStats {
    pub replaced: usize,
    pub ignored: usize,
    /// Rows actually changed by the batch (ignored duplicates are not counted).
    pub written: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub messages: i64,
    pub dialogs: i64,
    pub users: i64,
    pub messages_with_media: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
    Interrupted,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Interrupted => "interrupted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "running" => Some(RunStatus::Running),
            "success" => Some(RunStatus::Success),
            "failed" => Some(RunStatus::Failed),
            "interrupted" => Some(RunStatus::Interrupted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRun {
    pub id: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub status: RunStatus,
    pub top_message_id: i64,
    pub stats_json: Option<String>,
}
