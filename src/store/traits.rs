//! `ModerationStore` trait — the persistence seam of the moderation core.
//!
//! Backend-agnostic: the pipeline only ever sees this trait. The warning
//! counter and the pending-approval table carry the concurrency contract —
//! `increment_warnings` is an atomic increment-and-read, and
//! `take_pending_approval` consumes an entry in one step so at most one
//! decision is ever applied to it.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::transport::{ChatId, MessageId, UserId};

/// A quarantined media item awaiting the approver's decision.
///
/// Keyed by the identifier of the message forwarded to the approver; the
/// value points back at where the media came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingApproval {
    pub origin_chat: ChatId,
    pub origin_sender: UserId,
}

#[async_trait]
pub trait ModerationStore: Send + Sync {
    // ── Users & warnings ────────────────────────────────────────────

    /// Record a user lazily. Creates the row with a zero warning count, or
    /// refreshes the username of an existing row — never touches the count.
    async fn record_user(&self, user: UserId, username: &str) -> Result<(), StoreError>;

    /// Atomically increment a user's warning count and return the new value.
    /// Creates the user if unseen.
    async fn increment_warnings(&self, user: UserId) -> Result<u32, StoreError>;

    /// Reset a user's warning count to zero.
    async fn reset_warnings(&self, user: UserId) -> Result<(), StoreError>;

    /// Current warning count (zero for unseen users).
    async fn warning_count(&self, user: UserId) -> Result<u32, StoreError>;

    /// Resolve a username (with or without a leading `@`) to a user id.
    async fn user_id_by_username(&self, username: &str) -> Result<Option<UserId>, StoreError>;

    // ── Banned words ────────────────────────────────────────────────

    /// The configured banned-word set.
    async fn banned_words(&self) -> Result<Vec<String>, StoreError>;

    /// Add a banned word. Returns false when it was already present
    /// (idempotent no-op, not an error).
    async fn add_banned_word(&self, word: &str) -> Result<bool, StoreError>;

    // ── Chat licensing ──────────────────────────────────────────────

    /// Whether a chat is licensed to use the service.
    async fn is_chat_licensed(&self, chat: ChatId) -> Result<bool, StoreError>;

    /// License a chat. Returns false when it was already licensed.
    async fn license_chat(&self, chat: ChatId, title: &str) -> Result<bool, StoreError>;

    // ── Pending approvals ───────────────────────────────────────────

    /// Record a quarantined item, keyed by the forwarded message id.
    async fn insert_pending_approval(
        &self,
        forwarded: MessageId,
        origin_chat: ChatId,
        origin_sender: UserId,
    ) -> Result<(), StoreError>;

    /// Atomically remove and return the entry for a forwarded message id.
    /// A second take of the same key sees `None`.
    async fn take_pending_approval(
        &self,
        forwarded: MessageId,
    ) -> Result<Option<PendingApproval>, StoreError>;
}
