//! Wire-level shapes handed over by the fetch layer.
//!
//! Each entity is a closed enum over the constructors the archive understands.
//! `Unsupported` carries the name of a constructor a newer protocol layer
//! produced; the normalizer rejects it instead of dropping it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownConstructor {
    pub name: String,
}

impl UnknownConstructor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum Message {
    Message(TextMessage),
    Service(ServiceMessage),
    Empty { id: i64 },
    Unsupported(UnknownConstructor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub id: i64,
    pub to_id: Peer,
    pub from_id: Option<i64>,
    pub date: i64,
    #[serde(default)]
    pub message: String,
    pub media: Option<MessageMedia>,
    #[serde(default)]
    pub out: bool,
    pub reply_to_msg_id: Option<i64>,
    pub edit_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMessage {
    pub id: i64,
    pub to_id: Peer,
    pub from_id: Option<i64>,
    pub date: i64,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum Peer {
    Chat { chat_id: i64 },
    Channel { channel_id: i64 },
    User { user_id: i64 },
    Unsupported(UnknownConstructor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum MessageMedia {
    Photo {
        photo: Photo,
        #[serde(default)]
        caption: String,
    },
    Document {
        document: Document,
        #[serde(default)]
        caption: String,
    },
    Geo {
        lat: f64,
        long: f64,
    },
    Contact {
        phone_number: String,
        first_name: String,
        last_name: String,
        user_id: i64,
    },
    WebPage {
        url: String,
    },
    Unsupported(UnknownConstructor),
}

impl MessageMedia {
    /// Only documents and photos carry a caption.
    pub fn caption(&self) -> Option<&str> {
        match self {
            MessageMedia::Photo { caption, .. } | MessageMedia::Document { caption, .. } => {
                Some(caption.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum Photo {
    Photo { id: i64, date: i64 },
    Empty { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum Document {
    Document {
        id: i64,
        mime_type: String,
        size: i64,
        #[serde(default)]
        attributes: Vec<DocumentAttribute>,
    },
    Empty {
        id: i64,
    },
}

impl Document {
    pub fn sticker(&self) -> Option<&StickerAttribute> {
        match self {
            Document::Document { attributes, .. } => attributes.iter().find_map(|attr| match attr {
                DocumentAttribute::Sticker(sticker) => Some(sticker),
                _ => None,
            }),
            Document::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum DocumentAttribute {
    Sticker(StickerAttribute),
    Filename { file_name: String },
    ImageSize { w: i32, h: i32 },
    Animated,
    Video { duration: i32, w: i32, h: i32 },
    Audio { duration: i32, voice: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerAttribute {
    pub alt: String,
    pub stickerset: InputStickerSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum InputStickerSet {
    Empty,
    Id { id: i64, access_hash: i64 },
    ShortName { short_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum Chat {
    Empty { id: i64 },
    Chat { id: i64, title: String, participants_count: i32 },
    Forbidden { id: i64, title: String },
    Channel { id: i64, title: String, username: Option<String> },
    ChannelForbidden { id: i64, title: String },
    Unsupported(UnknownConstructor),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum User {
    User(UserProfile),
    Empty { id: i64 },
    Unsupported(UnknownConstructor),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_self: bool,
}
