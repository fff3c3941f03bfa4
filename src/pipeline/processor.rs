//! Moderation pipeline — routes every inbound event to a terminal action.
//!
//! Flow for a message:
//! 1. Admin command? → `CommandHandler` (privilege-gated, license-exempt)
//! 2. Approver reply in the approver's private chat? → approval resolution
//! 3. License gate — denial terminates (and the bot leaves the chat)
//! 4. Privilege check — privileged senders pass silently
//! 5. Media → quarantine; text → link then banned-word detection
//!
//! No message is re-evaluated: each step either terminates or falls
//! through to the next. Handlers isolate their own failures so one
//! rejected update never halts processing of the stream.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::PipelineError;
use crate::pipeline::approval::ApprovalWorkflow;
use crate::pipeline::classifier::{find_banned, has_link};
use crate::pipeline::commands::{Command, CommandHandler};
use crate::pipeline::gate::{AccessGate, GateDecision};
use crate::pipeline::ledger::WarningLedger;
use crate::pipeline::types::{InboundEvent, InboundMessage, MessageKind};
use crate::store::ModerationStore;
use crate::texts;
use crate::transport::Transport;

/// The moderation pipeline.
pub struct ModerationPipeline {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ModerationStore>,
    gate: Arc<AccessGate>,
    ledger: Arc<WarningLedger>,
    approvals: ApprovalWorkflow,
    commands: CommandHandler,
}

impl ModerationPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn ModerationStore>,
        owner_id: i64,
    ) -> Self {
        let gate = Arc::new(AccessGate::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            owner_id,
        ));
        let ledger = Arc::new(WarningLedger::new(
            Arc::clone(&transport),
            Arc::clone(&store),
        ));
        let approvals = ApprovalWorkflow::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            owner_id,
        );
        let commands = CommandHandler::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            Arc::clone(&gate),
            Arc::clone(&ledger),
        );
        Self {
            transport,
            store,
            gate,
            ledger,
            approvals,
            commands,
        }
    }

    /// Process one inbound event, isolating failures.
    ///
    /// This is the entry point the poller spawns per update; it never
    /// returns an error, so a failing handler cannot take the stream down.
    pub async fn handle(&self, event: InboundEvent) {
        let result = match &event {
            InboundEvent::Message(msg) => self.handle_message(msg).await,
            InboundEvent::BotJoinedChat { chat } => {
                self.gate.check(chat).await.map(|_| ())
            }
        };
        if let Err(e) = result {
            error!(error = %e, "Update handler failed");
        }
    }

    async fn handle_message(&self, msg: &InboundMessage) -> Result<(), PipelineError> {
        // Step 1: admin commands (privilege-gated inside, independent of
        // the license gate so /authorize can run in unlicensed chats).
        // Commands only count in real text, not media captions.
        if let Some(cmd) = Command::parse(msg.text.as_deref().unwrap_or("")) {
            return self.commands.handle(cmd, msg).await;
        }

        // Step 2: approval resolution — the approver replying to a
        // forwarded item in their private chat with the bot.
        if !msg.chat.is_group && msg.sender.id == self.gate.owner_id() {
            if let Some(reply) = &msg.reply_to {
                return self
                    .approvals
                    .resolve(reply.message, msg.effective_text(), msg.message)
                    .await;
            }
        }

        // Step 3: license gate.
        if self.gate.check(&msg.chat).await? == GateDecision::Denied {
            return Ok(());
        }

        // Step 4: privileged senders are exempt from everything below.
        if self.gate.is_privileged(msg.chat.id, msg.sender.id).await {
            return Ok(());
        }

        match msg.kind {
            MessageKind::Media => self.approvals.quarantine(msg).await,
            MessageKind::Text => self.handle_text(msg).await,
        }
    }

    /// Content matching for text messages.
    async fn handle_text(&self, msg: &InboundMessage) -> Result<(), PipelineError> {
        // Lazy user registration keeps /unmute username lookups working.
        self.store
            .record_user(msg.sender.id, msg.sender.handle())
            .await?;

        let text = msg.effective_text();
        if text.is_empty() {
            return Ok(());
        }

        if has_link(text, msg.has_url_entity) {
            self.punish(msg, texts::REASON_LINK, "link", text).await?;
            return Ok(());
        }

        let words = self.store.banned_words().await?;
        if let Some(word) = find_banned(text, &words) {
            let word = word.to_string();
            self.punish(msg, texts::REASON_BANNED_WORD, "banned_word", &word)
                .await?;
            return Ok(());
        }

        debug!(chat = msg.chat.id, sender = msg.sender.id, "Message passed");
        Ok(())
    }

    /// Delete the offending message and escalate. Deletion and escalation
    /// are independent: a failed delete must not suppress the warning.
    async fn punish(
        &self,
        msg: &InboundMessage,
        reason: &str,
        kind: &str,
        matched: &str,
    ) -> Result<(), PipelineError> {
        if let Err(e) = self.transport.delete_message(msg.chat.id, msg.message).await {
            warn!(chat = msg.chat.id, message = msg.message, error = %e, "Failed to delete offending message");
        }
        let count = self.ledger.escalate(msg.chat.id, &msg.sender, reason).await?;
        warn!(
            user = msg.sender.id,
            username = msg.sender.handle(),
            chat = msg.chat.id,
            kind,
            matched = truncate(matched, 100),
            count,
            "Violation detected"
        );
        Ok(())
    }
}

/// Keep log lines bounded on long messages.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
