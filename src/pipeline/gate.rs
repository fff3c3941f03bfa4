//! Access gate and privilege check.
//!
//! The gate decides whether a chat may use the service at all; the
//! privilege check decides whether a sender is exempt from moderation.
//! Both run before any content matching.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::types::ChatScope;
use crate::store::ModerationStore;
use crate::texts;
use crate::transport::{ChatId, SendOptions, Transport, UserId};

/// Outcome of the license gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// The chat is unlicensed; an explanation was sent and the bot left.
    Denied,
}

/// License gate + privilege check.
pub struct AccessGate {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ModerationStore>,
    owner_id: UserId,
}

impl AccessGate {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn ModerationStore>,
        owner_id: UserId,
    ) -> Self {
        Self {
            transport,
            store,
            owner_id,
        }
    }

    /// Check whether the chat may use the service.
    ///
    /// Private conversations are always allowed — licensing only governs
    /// groups. An unlicensed group gets one explanation message carrying
    /// its chat id for manual licensing, then the bot leaves. The leave is
    /// attempted exactly once; failure is logged, not retried.
    pub async fn check(&self, chat: &ChatScope) -> Result<GateDecision, PipelineError> {
        if !chat.is_group {
            return Ok(GateDecision::Allowed);
        }
        if self.store.is_chat_licensed(chat.id).await? {
            return Ok(GateDecision::Allowed);
        }

        info!(chat = chat.id, title = %chat.title, "Unlicensed chat, leaving");
        if let Err(e) = self
            .transport
            .send_message(chat.id, &texts::unlicensed(chat.id), SendOptions::html())
            .await
        {
            warn!(chat = chat.id, error = %e, "Failed to send license notice");
        }
        if let Err(e) = self.transport.leave_chat(chat.id).await {
            warn!(chat = chat.id, error = %e, "Failed to leave unlicensed chat");
        }
        Ok(GateDecision::Denied)
    }

    /// Whether a sender is exempt from moderation.
    ///
    /// The designated owner is privileged everywhere, unconditionally.
    /// Anyone else must hold an administrator or owner role in the chat;
    /// a failed role query counts as not privileged (fail closed).
    pub async fn is_privileged(&self, chat: ChatId, user: UserId) -> bool {
        if user == self.owner_id {
            return true;
        }
        match self.transport.member_role(chat, user).await {
            Ok(role) => role.is_admin(),
            Err(e) => {
                warn!(chat, user, error = %e, "Role query failed, treating as not privileged");
                false
            }
        }
    }

    /// The designated owner id.
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }
}
