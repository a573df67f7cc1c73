use sha2::{Digest, Sha256};

use crate::protocol::{InputStickerSet, StickerAttribute};

/// Derives the file name a converted sticker image is stored under.
///
/// Implementations must be pure: the same descriptor always yields the same
/// name, because the name is persisted with the message and later used to
/// locate the exported file.
pub trait StickerNamer {
    fn sticker_filename(&self, sticker: &StickerAttribute) -> Option<String>;
}

impl<F> StickerNamer for F
where
    F: Fn(&StickerAttribute) -> Option<String>,
{
    fn sticker_filename(&self, sticker: &StickerAttribute) -> Option<String> {
        self(sticker)
    }
}

/// `<set>_<hash of alt>.webp`, or nothing when the sticker has no set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStickerNamer;

impl StickerNamer for DefaultStickerNamer {
    fn sticker_filename(&self, sticker: &StickerAttribute) -> Option<String> {
        let set = match &sticker.stickerset {
            InputStickerSet::Empty => return None,
            InputStickerSet::Id { id, .. } => id.to_string(),
            InputStickerSet::ShortName { short_name } => sanitize(short_name),
        };
        let mut hasher = Sha256::new();
        hasher.update(sticker.alt.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Some(format!("{}_{}.webp", set, &digest[..16]))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}
