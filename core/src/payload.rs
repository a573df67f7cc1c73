//! Raw message bodies kept next to the derived columns.
//!
//! The body is the complete serialized `Message`, so a stored row can be
//! turned back into exactly what the fetch layer handed over, independent of
//! how `text`, `sticker` or `dialog_id` were derived at write time.

use crate::error::CoreError;
use crate::protocol::{Message, TextMessage};

pub fn encode_message(message: &Message) -> Result<Vec<u8>, CoreError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode_message(data: &[u8]) -> Result<Message, CoreError> {
    Ok(serde_json::from_slice(data)?)
}

/// Decodes a body that must hold a regular message.
pub fn decode_text_message(data: &[u8]) -> Result<TextMessage, CoreError> {
    match decode_message(data)? {
        Message::Message(msg) => Ok(msg),
        Message::Service(msg) => {
            Err(CoreError::unexpected("message", format!("service #{}", msg.id)))
        }
        Message::Empty { id } => Err(CoreError::unexpected("message", format!("empty #{}", id))),
        Message::Unsupported(unknown) => Err(CoreError::unexpected("message", unknown.name)),
    }
}
