//! serde models for the slice of the Bot API this service consumes.

use serde::Deserialize;

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// One long-poll update.
#[derive(Debug, Clone, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub entities: Vec<TgEntity>,
    #[serde(default)]
    pub caption_entities: Vec<TgEntity>,
    pub reply_to_message: Option<Box<TgMessage>>,
    // Media presence only — the content itself is never inspected.
    pub photo: Option<serde_json::Value>,
    pub video: Option<serde_json::Value>,
    pub animation: Option<serde_json::Value>,
    pub sticker: Option<serde_json::Value>,
    #[serde(default)]
    pub new_chat_members: Vec<TgUser>,
}

impl TgMessage {
    /// Photo/video/GIF/sticker — the kinds routed to human review.
    pub fn has_media(&self) -> bool {
        self.photo.is_some()
            || self.video.is_some()
            || self.animation.is_some()
            || self.sticker.is_some()
    }

    /// Any URL or text-link annotation on the text or caption.
    pub fn has_url_entity(&self) -> bool {
        self.entities
            .iter()
            .chain(self.caption_entities.iter())
            .any(TgEntity::is_link)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
}

impl TgChat {
    pub fn is_group(&self) -> bool {
        self.kind == "group" || self.kind == "supergroup"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgEntity {
    #[serde(rename = "type")]
    pub kind: String,
}

impl TgEntity {
    pub fn is_link(&self) -> bool {
        self.kind == "url" || self.kind == "text_link"
    }
}

/// `getChatMember` result — only the status matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct TgChatMember {
    pub status: String,
}

/// Handle to a sent/forwarded message.
#[derive(Debug, Clone, Deserialize)]
pub struct TgMessageRef {
    pub message_id: i64,
}
