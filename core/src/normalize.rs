use crate::error::CoreError;
use crate::models::{
    DialogKind, DialogRecord, MessageKind, MessageRecord, Normalized, PeerKind, UserKind,
    UserRecord,
};
use crate::payload::encode_message;
use crate::protocol::{Chat, Message, MessageMedia, Peer, TextMessage, User};
use crate::sticker::{DefaultStickerNamer, StickerNamer};

/// Maps protocol values to archive rows. Holds no connection; every method is pure.
pub struct Normalizer<N = DefaultStickerNamer> {
    owner_id: i64,
    namer: N,
}

impl Normalizer<DefaultStickerNamer> {
    pub fn new(owner_id: i64) -> Self {
        Self {
            owner_id,
            namer: DefaultStickerNamer,
        }
    }
}

impl<N: StickerNamer> Normalizer<N> {
    pub fn with_namer(owner_id: i64, namer: N) -> Self {
        Self { owner_id, namer }
    }

    pub fn message(&self, message: &Message) -> Result<Normalized<MessageRecord>, CoreError> {
        match message {
            Message::Message(msg) => {
                let mut row = self.text_message(msg)?;
                row.data = Some(encode_message(message)?);
                Ok(Normalized::replace(row))
            }
            Message::Service(msg) => {
                let mut row = MessageRecord::placeholder(msg.id, MessageKind::ServiceMessage);
                row.data = Some(encode_message(message)?);
                Ok(Normalized::ignore(row))
            }
            Message::Empty { id } => {
                let mut row = MessageRecord::placeholder(*id, MessageKind::EmptyMessage);
                row.data = Some(encode_message(message)?);
                Ok(Normalized::ignore(row))
            }
            Message::Unsupported(unknown) => Err(CoreError::unexpected("message", &unknown.name)),
        }
    }

    fn text_message(&self, msg: &TextMessage) -> Result<MessageRecord, CoreError> {
        let (dialog_id, to_id, from_type) = match &msg.to_id {
            Peer::Chat { chat_id } => (*chat_id, *chat_id, PeerKind::Chat),
            Peer::Channel { channel_id } => (*channel_id, *channel_id, PeerKind::Channel),
            Peer::User { user_id } => {
                // Messages addressed to the owner belong to the sender's thread.
                let dialog_id = if *user_id == self.owner_id {
                    msg.from_id.unwrap_or(*user_id)
                } else {
                    *user_id
                };
                (dialog_id, *user_id, PeerKind::User)
            }
            Peer::Unsupported(unknown) => return Err(CoreError::unexpected("peer", &unknown.name)),
        };

        let caption = msg.media.as_ref().and_then(MessageMedia::caption);
        let text = match caption {
            Some(caption) if msg.message.is_empty() => caption.to_string(),
            _ => msg.message.clone(),
        };

        let sticker = match &msg.media {
            Some(MessageMedia::Document { document, .. }) => document
                .sticker()
                .and_then(|attr| self.namer.sticker_filename(attr)),
            _ => None,
        };

        Ok(MessageRecord {
            id: msg.id,
            dialog_id: Some(dialog_id),
            to_id: Some(to_id),
            from_id: msg.from_id,
            from_type: Some(from_type),
            text: Some(text),
            time: Some(msg.date.to_string()),
            has_media: Some(msg.media.is_some()),
            sticker,
            data: None,
            kind: MessageKind::Message,
        })
    }

    pub fn dialog(&self, chat: &Chat) -> Result<Normalized<DialogRecord>, CoreError> {
        let row = |id: i64, name: Option<&String>, kind: DialogKind| DialogRecord {
            id,
            name: name.cloned(),
            kind,
        };
        match chat {
            Chat::Empty { id } => Ok(Normalized::ignore(row(*id, None, DialogKind::EmptyChat))),
            Chat::Forbidden { id, title } | Chat::Chat { id, title, .. } => {
                Ok(Normalized::replace(row(*id, Some(title), DialogKind::Chat)))
            }
            Chat::ChannelForbidden { id, title } | Chat::Channel { id, title, .. } => {
                Ok(Normalized::replace(row(*id, Some(title), DialogKind::Channel)))
            }
            Chat::Unsupported(unknown) => Err(CoreError::unexpected("chat", &unknown.name)),
        }
    }

    pub fn user(&self, user: &User) -> Result<Normalized<UserRecord>, CoreError> {
        match user {
            User::User(profile) => Ok(Normalized::replace(UserRecord {
                id: profile.id,
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                username: profile.username.clone(),
                phone: profile.phone.clone(),
                kind: UserKind::User,
            })),
            User::Empty { id } => Ok(Normalized::ignore(UserRecord {
                id: *id,
                first_name: None,
                last_name: None,
                username: None,
                phone: None,
                kind: UserKind::EmptyUser,
            })),
            User::Unsupported(unknown) => Err(CoreError::unexpected("user", &unknown.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UpsertPolicy;
    use crate::protocol::{
        Document, DocumentAttribute, InputStickerSet, Photo, StickerAttribute, UnknownConstructor,
        UserProfile,
    };

    const OWNER: i64 = 1000;

    fn text(
        id: i64,
        to_id: Peer,
        from_id: i64,
        body: &str,
        media: Option<MessageMedia>,
    ) -> Message {
        Message::Message(TextMessage {
            id,
            to_id,
            from_id: Some(from_id),
            date: 1_500_000_000 + id,
            message: body.to_string(),
            media,
            out: false,
            reply_to_msg_id: None,
            edit_date: None,
        })
    }

    fn document(caption: &str, attributes: Vec<DocumentAttribute>) -> MessageMedia {
        MessageMedia::Document {
            document: Document::Document {
                id: 77,
                mime_type: "image/webp".to_string(),
                size: 2048,
                attributes,
            },
            caption: caption.to_string(),
        }
    }

    #[test]
    fn chat_peer_owns_the_dialog() {
        let n = Normalizer::new(OWNER);
        let out = n
            .message(&text(1, Peer::Chat { chat_id: 55 }, 7, "hi", None))
            .expect("normalize");
        assert_eq!(out.policy, UpsertPolicy::Replace);
        assert_eq!(out.row.dialog_id, Some(55));
        assert_eq!(out.row.from_type, Some(PeerKind::Chat));
        assert_eq!(out.row.from_id, Some(7));
        assert_eq!(out.row.time.as_deref(), Some("1500000001"));
        assert_eq!(out.row.has_media, Some(false));
        assert!(out.row.data.is_some());
    }

    #[test]
    fn channel_peer_kind() {
        let n = Normalizer::new(OWNER);
        let out = n
            .message(&text(2, Peer::Channel { channel_id: 9 }, 7, "news", None))
            .expect("normalize");
        assert_eq!(out.row.dialog_id, Some(9));
        assert_eq!(out.row.from_type, Some(PeerKind::Channel));
    }

    #[test]
    fn message_to_owner_lands_in_sender_dialog() {
        let n = Normalizer::new(OWNER);
        let out = n
            .message(&text(3, Peer::User { user_id: OWNER }, 42, "hey", None))
            .expect("normalize");
        assert_eq!(out.row.dialog_id, Some(42));
        assert_eq!(out.row.to_id, Some(OWNER));
        assert_eq!(out.row.from_type, Some(PeerKind::User));
    }

    #[test]
    fn message_to_other_user_keeps_peer_dialog() {
        let n = Normalizer::new(OWNER);
        let out = n
            .message(&text(4, Peer::User { user_id: 42 }, OWNER, "yo", None))
            .expect("normalize");
        assert_eq!(out.row.dialog_id, Some(42));
    }

    #[test]
    fn unsupported_peer_is_rejected() {
        let n = Normalizer::new(OWNER);
        let err = n
            .message(&text(
                5,
                Peer::Unsupported(UnknownConstructor::new("peerSecret")),
                1,
                "x",
                None,
            ))
            .expect_err("must fail");
        assert!(matches!(err, CoreError::UnexpectedVariant { entity: "peer", .. }));
    }

    #[test]
    fn empty_text_falls_back_to_caption() {
        let n = Normalizer::new(OWNER);
        let out = n
            .message(&text(6, Peer::Chat { chat_id: 1 }, 2, "", Some(document("look", vec![]))))
            .expect("normalize");
        assert_eq!(out.row.text.as_deref(), Some("look"));
        assert_eq!(out.row.has_media, Some(true));
    }

    #[test]
    fn photo_caption_is_used() {
        let n = Normalizer::new(OWNER);
        let media = MessageMedia::Photo {
            photo: Photo::Photo { id: 3, date: 10 },
            caption: "sunset".to_string(),
        };
        let out = n
            .message(&text(7, Peer::Chat { chat_id: 1 }, 2, "", Some(media)))
            .expect("normalize");
        assert_eq!(out.row.text.as_deref(), Some("sunset"));
    }

    #[test]
    fn own_text_wins_over_caption() {
        let n = Normalizer::new(OWNER);
        let out = n
            .message(&text(8, Peer::Chat { chat_id: 1 }, 2, "body", Some(document("cap", vec![]))))
            .expect("normalize");
        assert_eq!(out.row.text.as_deref(), Some("body"));
    }

    #[test]
    fn uncaptioned_media_still_flags_has_media() {
        let n = Normalizer::new(OWNER);
        let media = MessageMedia::Geo { lat: 1.5, long: 2.5 };
        let out = n
            .message(&text(9, Peer::Chat { chat_id: 1 }, 2, "", Some(media)))
            .expect("normalize");
        assert_eq!(out.row.text.as_deref(), Some(""));
        assert_eq!(out.row.has_media, Some(true));
        assert_eq!(out.row.sticker, None);
    }

    #[test]
    fn sticker_document_gets_filename() {
        let namer = |attr: &StickerAttribute| Some(format!("sticker-{}", attr.alt));
        let n = Normalizer::with_namer(OWNER, namer);
        let attrs = vec![
            DocumentAttribute::ImageSize { w: 512, h: 512 },
            DocumentAttribute::Sticker(StickerAttribute {
                alt: "cat".to_string(),
                stickerset: InputStickerSet::ShortName {
                    short_name: "Cats".to_string(),
                },
            }),
        ];
        let out = n
            .message(&text(10, Peer::Chat { chat_id: 1 }, 2, "", Some(document("", attrs))))
            .expect("normalize");
        assert_eq!(out.row.sticker.as_deref(), Some("sticker-cat"));
        assert_eq!(out.row.text.as_deref(), Some(""));
    }

    #[test]
    fn service_and_empty_messages_are_placeholders() {
        let n = Normalizer::new(OWNER);
        let service = Message::Service(crate::protocol::ServiceMessage {
            id: 11,
            to_id: Peer::Chat { chat_id: 1 },
            from_id: Some(2),
            date: 5,
            action: "chat_add_user".to_string(),
        });
        let out = n.message(&service).expect("normalize");
        assert_eq!(out.policy, UpsertPolicy::Ignore);
        assert_eq!(out.row.kind, MessageKind::ServiceMessage);
        assert_eq!(out.row.dialog_id, None);
        assert_eq!(out.row.text, None);
        assert_eq!(out.row.has_media, None);

        let out = n.message(&Message::Empty { id: 12 }).expect("normalize");
        assert_eq!(out.policy, UpsertPolicy::Ignore);
        assert_eq!(out.row.kind, MessageKind::EmptyMessage);
        assert_eq!(out.row.id, 12);
    }

    #[test]
    fn dialog_variants() {
        let n = Normalizer::new(OWNER);
        let empty = n.dialog(&Chat::Empty { id: 1 }).expect("empty");
        assert_eq!(empty.policy, UpsertPolicy::Ignore);
        assert_eq!(empty.row.kind, DialogKind::EmptyChat);
        assert_eq!(empty.row.name, None);

        let forbidden = n
            .dialog(&Chat::ChannelForbidden {
                id: 2,
                title: "Closed".to_string(),
            })
            .expect("forbidden");
        assert_eq!(forbidden.policy, UpsertPolicy::Replace);
        assert_eq!(forbidden.row.kind, DialogKind::Channel);
        assert_eq!(forbidden.row.name.as_deref(), Some("Closed"));

        let chat = n
            .dialog(&Chat::Chat {
                id: 3,
                title: "Family".to_string(),
                participants_count: 4,
            })
            .expect("chat");
        assert_eq!(chat.row.kind, DialogKind::Chat);

        assert!(n
            .dialog(&Chat::Unsupported(UnknownConstructor::new("chatInvite")))
            .is_err());
    }

    #[test]
    fn user_variants() {
        let n = Normalizer::new(OWNER);
        let full = n
            .user(&User::User(UserProfile {
                id: 5,
                first_name: Some("Ada".to_string()),
                last_name: None,
                username: Some("ada".to_string()),
                phone: Some("15550001111".to_string()),
                is_self: false,
            }))
            .expect("user");
        assert_eq!(full.policy, UpsertPolicy::Replace);
        assert_eq!(full.row.phone.as_deref(), Some("15550001111"));

        let empty = n.user(&User::Empty { id: 6 }).expect("empty");
        assert_eq!(empty.policy, UpsertPolicy::Ignore);
        assert_eq!(empty.row.kind, UserKind::EmptyUser);
        assert_eq!(empty.row.first_name, None);

        assert!(n
            .user(&User::Unsupported(UnknownConstructor::new("userDeleted")))
            .is_err());
    }
}
