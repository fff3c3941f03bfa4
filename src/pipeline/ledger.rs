//! Warning ledger — counter escalation and suspension.
//!
//! The single punishment path: automatic content violations and the manual
//! `/warn` command both land here, so counting and suspension semantics
//! cannot drift apart. The increment is atomic in the store; this module
//! never reads-then-writes a count.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::PipelineError;
use crate::notices;
use crate::pipeline::types::Sender;
use crate::store::ModerationStore;
use crate::texts;
use crate::transport::{ChatId, SendOptions, Transport};

/// Warnings before suspension.
pub const WARN_LIMIT: u32 = 3;

/// How long escalation notices stay up.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Per-user warning counter with a suspension threshold.
pub struct WarningLedger {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ModerationStore>,
}

impl WarningLedger {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn ModerationStore>) -> Self {
        Self { transport, store }
    }

    /// Count a violation against `sender` and issue the matching notice.
    ///
    /// At the threshold a suspension is attempted; if the platform refuses
    /// (e.g. the bot lacks the right), the count is still recorded and a
    /// degraded notice says so. A count already past the threshold attempts
    /// suspension again on every further violation.
    pub async fn escalate(
        &self,
        chat: ChatId,
        sender: &Sender,
        reason: &str,
    ) -> Result<u32, PipelineError> {
        let count = self.store.increment_warnings(sender.id).await?;
        let mention = texts::mention(sender.id, &sender.display_name);

        let notice = if count >= WARN_LIMIT {
            match self.transport.ban_member(chat, sender.id).await {
                Ok(()) => texts::suspended(&mention, reason),
                Err(e) => {
                    warn!(chat, user = sender.id, error = %e, "Suspension attempt failed");
                    texts::suspension_failed(&mention)
                }
            }
        } else {
            texts::warning(&mention, reason, count, WARN_LIMIT)
        };

        notices::send_transient(&self.transport, chat, &notice, SendOptions::html(), NOTICE_TTL)
            .await;
        Ok(count)
    }

    /// Reset a user's count to zero (part of `/unmute`).
    pub async fn reset(&self, user: i64) -> Result<(), PipelineError> {
        self.store.reset_warnings(user).await?;
        Ok(())
    }
}
