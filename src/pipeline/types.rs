//! Shared types for the moderation pipeline.
//!
//! The transport adapter converts platform-native updates into these
//! structs; the pipeline never sees wire formats.

use crate::transport::{ChatId, MessageId, UserId};

/// The conversation a message arrived in.
#[derive(Debug, Clone)]
pub struct ChatScope {
    pub id: ChatId,
    /// Display title (groups); empty for private conversations.
    pub title: String,
    /// Group or supergroup, as opposed to a private conversation.
    pub is_group: bool,
}

/// Who sent a message.
#[derive(Debug, Clone)]
pub struct Sender {
    pub id: UserId,
    /// Platform handle, if the user has one.
    pub username: Option<String>,
    /// Human-readable name for mentions.
    pub display_name: String,
}

impl Sender {
    /// Handle for storage/lookup; falls back to the display name.
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.display_name)
    }
}

/// What the replied-to message was, for reply-targeted commands and
/// approval resolution.
#[derive(Debug, Clone)]
pub struct ReplyRef {
    pub message: MessageId,
    pub sender: Option<Sender>,
}

/// Coarse message kind — decides which pipeline branch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Plain text (or anything else carrying only text).
    Text,
    /// Photo, video, animation, or sticker — quarantined for human review.
    Media,
}

/// Unified inbound message from the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat: ChatScope,
    pub sender: Sender,
    pub message: MessageId,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// The platform attached a URL/text-link annotation to the text or caption.
    pub has_url_entity: bool,
    pub reply_to: Option<ReplyRef>,
}

impl InboundMessage {
    /// Message text, falling back to the caption.
    pub fn effective_text(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

/// An event the pipeline processes.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Message(InboundMessage),
    /// The bot was added to a chat — the license gate runs immediately.
    BotJoinedChat { chat: ChatScope },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: Option<&str>, caption: Option<&str>) -> InboundMessage {
        InboundMessage {
            chat: ChatScope {
                id: -1,
                title: "g".into(),
                is_group: true,
            },
            sender: Sender {
                id: 1,
                username: None,
                display_name: "x".into(),
            },
            message: 1,
            kind: MessageKind::Text,
            text: text.map(String::from),
            caption: caption.map(String::from),
            has_url_entity: false,
            reply_to: None,
        }
    }

    #[test]
    fn effective_text_prefers_text() {
        assert_eq!(message(Some("t"), Some("c")).effective_text(), "t");
    }

    #[test]
    fn effective_text_falls_back_to_caption() {
        assert_eq!(message(None, Some("c")).effective_text(), "c");
    }

    #[test]
    fn effective_text_empty_when_neither() {
        assert_eq!(message(None, None).effective_text(), "");
    }

    #[test]
    fn sender_handle_falls_back_to_display_name() {
        let mut s = Sender {
            id: 1,
            username: Some("handle".into()),
            display_name: "Name".into(),
        };
        assert_eq!(s.handle(), "handle");
        s.username = None;
        assert_eq!(s.handle(), "Name");
    }
}
