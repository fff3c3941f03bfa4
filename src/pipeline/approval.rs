//! Approval workflow — media quarantine and the approver's decision.
//!
//! Media from non-privileged senders never reaches the group directly: the
//! original is forwarded to the designated approver, removed from the
//! group, and parked as a pending entry keyed by the forwarded message id.
//! The approver resolves it by replying to that forwarded message with the
//! approve or reject token. Entries have no expiry — an unanswered item
//! waits indefinitely, visible in the store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::notices;
use crate::pipeline::types::InboundMessage;
use crate::store::ModerationStore;
use crate::texts;
use crate::transport::{MessageId, SendOptions, Transport, UserId};

/// TTL of the "sent for review" group notice.
const REVIEW_NOTICE_TTL: Duration = Duration::from_secs(5);
/// TTL of the rejection notice in the origin chat.
const REJECT_NOTICE_TTL: Duration = Duration::from_secs(10);

/// The approver's decision on a quarantined item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Parse a reply text as a decision. Anything but the two exact
    /// locale tokens is not a decision.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            texts::APPROVE_TOKEN => Some(Decision::Approve),
            texts::REJECT_TOKEN => Some(Decision::Reject),
            _ => None,
        }
    }
}

/// Quarantine and resolution flows.
pub struct ApprovalWorkflow {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ModerationStore>,
    /// The approver's user id; their private chat has the same id.
    approver: UserId,
}

impl ApprovalWorkflow {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn ModerationStore>,
        approver: UserId,
    ) -> Self {
        Self {
            transport,
            store,
            approver,
        }
    }

    /// Quarantine a media message: forward to the approver, record the
    /// pending entry, delete the original, notify the group.
    ///
    /// Forward failure must not leave the media sitting in the group — the
    /// delete runs regardless of the forward outcome.
    pub async fn quarantine(&self, msg: &InboundMessage) -> Result<(), PipelineError> {
        match self
            .transport
            .forward_message(self.approver, msg.chat.id, msg.message)
            .await
        {
            Ok(forwarded) => {
                self.store
                    .insert_pending_approval(forwarded.message, msg.chat.id, msg.sender.id)
                    .await?;
                let mention = texts::mention(msg.sender.id, &msg.sender.display_name);
                let prompt = texts::approval_prompt(&mention, &msg.chat.title);
                if let Err(e) = self
                    .transport
                    .send_message(self.approver, &prompt, SendOptions::html())
                    .await
                {
                    warn!(error = %e, "Failed to send approval prompt");
                }
                info!(
                    chat = msg.chat.id,
                    sender = msg.sender.id,
                    forwarded = forwarded.message,
                    "Media quarantined"
                );
            }
            Err(e) => {
                warn!(chat = msg.chat.id, error = %e, "Forward to approver failed");
            }
        }

        if let Err(e) = self.transport.delete_message(msg.chat.id, msg.message).await {
            warn!(chat = msg.chat.id, message = msg.message, error = %e, "Failed to delete quarantined media");
        }

        let mention = texts::mention(msg.sender.id, &msg.sender.display_name);
        notices::send_transient(
            &self.transport,
            msg.chat.id,
            &texts::sent_for_review(&mention),
            SendOptions::html(),
            REVIEW_NOTICE_TTL,
        )
        .await;
        Ok(())
    }

    /// Resolve a pending item from the approver's reply.
    ///
    /// The caller has already verified the sender is the approver and the
    /// message replies to `forwarded`. Unrecognized reply texts change
    /// nothing; a recognized decision consumes the entry exactly once, so
    /// a second decision on the same key gets the "not found" response.
    pub async fn resolve(
        &self,
        forwarded: MessageId,
        reply_text: &str,
        ack_reply_to: MessageId,
    ) -> Result<(), PipelineError> {
        let Some(decision) = Decision::parse(reply_text) else {
            return Ok(());
        };

        let Some(pending) = self.store.take_pending_approval(forwarded).await? else {
            if let Err(e) = self
                .transport
                .send_message(
                    self.approver,
                    texts::APPROVAL_NOT_FOUND,
                    SendOptions::html_reply(ack_reply_to),
                )
                .await
            {
                warn!(error = %e, "Failed to send not-found response");
            }
            return Ok(());
        };

        match decision {
            Decision::Approve => {
                match self
                    .transport
                    .copy_message(
                        pending.origin_chat,
                        self.approver,
                        forwarded,
                        Some(texts::APPROVED_CAPTION),
                    )
                    .await
                {
                    Ok(_) => {
                        info!(chat = pending.origin_chat, "Media approved and re-sent");
                        self.ack(ack_reply_to, texts::APPROVAL_SENT_ACK).await;
                    }
                    Err(e) => {
                        warn!(chat = pending.origin_chat, error = %e, "Failed to re-send approved media");
                    }
                }
            }
            Decision::Reject => {
                let mention = texts::mention(pending.origin_sender, "کاربر");
                notices::send_transient(
                    &self.transport,
                    pending.origin_chat,
                    &texts::media_rejected(&mention),
                    SendOptions::html(),
                    REJECT_NOTICE_TTL,
                )
                .await;
                info!(chat = pending.origin_chat, "Media rejected");
                self.ack(ack_reply_to, texts::APPROVAL_REJECTED_ACK).await;
            }
        }
        Ok(())
    }

    /// Best-effort acknowledgment in the approver's chat.
    async fn ack(&self, reply_to: MessageId, text: &str) {
        if let Err(e) = self
            .transport
            .send_message(self.approver, text, SendOptions::html_reply(reply_to))
            .await
        {
            warn!(error = %e, "Failed to send approval ack");
        }
    }
}
