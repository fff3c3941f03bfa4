//! Chat-platform transport seam.
//!
//! The moderation core talks to the chat platform only through the
//! [`Transport`] trait — pure I/O, no moderation logic. The concrete
//! Bot API client lives in [`crate::telegram`]; tests substitute a
//! recording stub.

use async_trait::async_trait;

use crate::error::TransportError;

/// Chat identifier (negative for groups on the reference platform).
pub type ChatId = i64;
/// User identifier.
pub type UserId = i64;
/// Message identifier, unique within a chat.
pub type MessageId = i64;

/// Handle to a message the transport produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message: MessageId,
}

/// Options for an outbound text message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    /// Render the text as HTML (mentions, bold).
    pub html: bool,
    /// Send as a reply to this message.
    pub reply_to: Option<MessageId>,
}

impl SendOptions {
    /// HTML-formatted message, no reply target.
    pub fn html() -> Self {
        Self {
            html: true,
            reply_to: None,
        }
    }

    /// HTML-formatted reply to a specific message.
    pub fn html_reply(reply_to: MessageId) -> Self {
        Self {
            html: true,
            reply_to: Some(reply_to),
        }
    }
}

/// A member's role within a chat, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    /// Chat creator.
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
    /// Platform reported a status this client does not model.
    Unknown,
}

impl MemberRole {
    /// Administrator or chat owner/creator.
    pub fn is_admin(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }
}

/// Permission set for `restrict_member`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberPermissions {
    pub can_send_messages: bool,
    pub can_send_media: bool,
    pub can_send_polls: bool,
    pub can_add_web_page_previews: bool,
}

impl MemberPermissions {
    /// Everything a default group member may do.
    pub fn unrestricted() -> Self {
        Self {
            can_send_messages: true,
            can_send_media: true,
            can_send_polls: true,
            can_add_web_page_previews: true,
        }
    }

    /// Full mute.
    pub fn muted() -> Self {
        Self {
            can_send_messages: false,
            can_send_media: false,
            can_send_polls: false,
            can_add_web_page_previews: false,
        }
    }
}

/// Trait for the chat platform — the operations the moderation core needs.
///
/// Every operation is fallible; the core never retries (retry policy, if
/// any, belongs to the adapter behind this trait).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message to a chat.
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageRef, TransportError>;

    /// Delete a message.
    async fn delete_message(&self, chat: ChatId, message: MessageId)
    -> Result<(), TransportError>;

    /// Forward a message to another chat, returning the new message handle.
    async fn forward_message(
        &self,
        to: ChatId,
        from: ChatId,
        message: MessageId,
    ) -> Result<MessageRef, TransportError>;

    /// Re-send (copy) a message into a chat with an overridden caption.
    /// The copy carries no link back to the source message.
    async fn copy_message(
        &self,
        to: ChatId,
        from: ChatId,
        message: MessageId,
        caption: Option<&str>,
    ) -> Result<MessageRef, TransportError>;

    /// Ban a member from a chat.
    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), TransportError>;

    /// Lift a ban.
    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<(), TransportError>;

    /// Replace a member's permission set.
    async fn restrict_member(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
    ) -> Result<(), TransportError>;

    /// Fetch a member's role in a chat.
    async fn member_role(&self, chat: ChatId, user: UserId) -> Result<MemberRole, TransportError>;

    /// Make the bot leave a chat.
    async fn leave_chat(&self, chat: ChatId) -> Result<(), TransportError>;
}
