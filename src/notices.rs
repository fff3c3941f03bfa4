//! Ephemeral notice scheduler.
//!
//! Transient bot messages (warnings, command feedback) clean themselves up
//! after a fixed delay. Deletion is fire-and-forget: the job never blocks
//! the handler that scheduled it, and an already-gone target counts as
//! success, so failures are only logged at debug level.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::transport::{ChatId, MessageId, SendOptions, Transport};

/// Schedule a message for deletion after `delay`.
pub fn schedule_delete(
    transport: Arc<dyn Transport>,
    chat: ChatId,
    message: MessageId,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = transport.delete_message(chat, message).await {
            debug!(chat, message, error = %e, "Scheduled delete failed");
        }
    });
}

/// Send a transient notice and schedule it for deletion after `ttl`.
///
/// Send failures are logged and swallowed — transient notices are cosmetic,
/// never correctness-bearing.
pub async fn send_transient(
    transport: &Arc<dyn Transport>,
    chat: ChatId,
    text: &str,
    opts: SendOptions,
    ttl: Duration,
) {
    match transport.send_message(chat, text, opts).await {
        Ok(sent) => schedule_delete(Arc::clone(transport), sent.chat, sent.message, ttl),
        Err(e) => debug!(chat, error = %e, "Transient notice send failed"),
    }
}
