//! Admin command surface — `/warn`, `/ban`, `/unmute`, `/addword`,
//! `/authorize`.
//!
//! Thin layer over the privilege check and the warning ledger. Commands
//! from non-privileged senders are dropped silently (ordinary members get
//! no hint the commands exist). Every command deletes its trigger message
//! best-effort and answers with a transient notice, except `/authorize`,
//! whose confirmation stays.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::notices;
use crate::pipeline::gate::AccessGate;
use crate::pipeline::ledger::WarningLedger;
use crate::pipeline::types::InboundMessage;
use crate::store::ModerationStore;
use crate::texts;
use crate::transport::{MemberPermissions, SendOptions, Transport, UserId};

/// Leading command token, with an optional `@BotName` suffix.
static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([a-zA-Z_]+)(?:@\S+)?").unwrap());

const HINT_TTL: Duration = Duration::from_secs(3);
const RESULT_TTL: Duration = Duration::from_secs(5);
const WORD_TTL: Duration = Duration::from_secs(2);

/// A recognized admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Warn,
    Ban,
    Unmute { target: Option<String> },
    AddWord { word: String },
    Authorize,
}

impl Command {
    /// Parse a message text as a command. Non-commands and unknown
    /// commands are `None`.
    pub fn parse(text: &str) -> Option<Command> {
        let caps = COMMAND_RE.captures(text)?;
        let name = caps.get(1)?.as_str().to_ascii_lowercase();
        let rest = text[caps.get(0)?.end()..].trim();
        match name.as_str() {
            "warn" => Some(Command::Warn),
            "ban" => Some(Command::Ban),
            "unmute" => Some(Command::Unmute {
                target: rest.split_whitespace().next().map(str::to_string),
            }),
            // The whole argument tail is one literal word/phrase.
            "addword" => Some(Command::AddWord {
                word: rest.to_string(),
            }),
            "authorize" => Some(Command::Authorize),
            _ => None,
        }
    }
}

/// Where an `/unmute` invocation points.
enum UnmuteTarget {
    Resolved(UserId, String),
    UnknownUsername(String),
    Missing,
}

/// Executes admin commands.
pub struct CommandHandler {
    transport: Arc<dyn Transport>,
    store: Arc<dyn ModerationStore>,
    gate: Arc<AccessGate>,
    ledger: Arc<WarningLedger>,
}

impl CommandHandler {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn ModerationStore>,
        gate: Arc<AccessGate>,
        ledger: Arc<WarningLedger>,
    ) -> Self {
        Self {
            transport,
            store,
            gate,
            ledger,
        }
    }

    /// Run a parsed command in the context of the message that carried it.
    pub async fn handle(&self, cmd: Command, msg: &InboundMessage) -> Result<(), PipelineError> {
        // /authorize is owner-only; everything else takes chat admins too.
        let privileged = match cmd {
            Command::Authorize => msg.sender.id == self.gate.owner_id(),
            _ => self.gate.is_privileged(msg.chat.id, msg.sender.id).await,
        };
        if !privileged {
            return Ok(());
        }

        // Keep the chat clean: the trigger message goes first.
        if let Err(e) = self.transport.delete_message(msg.chat.id, msg.message).await {
            warn!(chat = msg.chat.id, error = %e, "Failed to delete command message");
        }

        match cmd {
            Command::Warn => self.warn_cmd(msg).await,
            Command::Ban => self.ban_cmd(msg).await,
            Command::Unmute { target } => self.unmute_cmd(msg, target.as_deref()).await,
            Command::AddWord { word } => self.addword_cmd(msg, &word).await,
            Command::Authorize => self.authorize_cmd(msg).await,
        }
    }

    async fn warn_cmd(&self, msg: &InboundMessage) -> Result<(), PipelineError> {
        let Some(target) = msg.reply_to.as_ref().and_then(|r| r.sender.clone()) else {
            notices::send_transient(
                &self.transport,
                msg.chat.id,
                texts::REPLY_REQUIRED,
                SendOptions::default(),
                HINT_TTL,
            )
            .await;
            return Ok(());
        };
        let count = self
            .ledger
            .escalate(msg.chat.id, &target, texts::REASON_MANUAL)
            .await?;
        info!(chat = msg.chat.id, target = target.id, count, "Manual warning issued");
        Ok(())
    }

    async fn ban_cmd(&self, msg: &InboundMessage) -> Result<(), PipelineError> {
        let Some(target) = msg.reply_to.as_ref().and_then(|r| r.sender.clone()) else {
            notices::send_transient(
                &self.transport,
                msg.chat.id,
                texts::REPLY_REQUIRED,
                SendOptions::default(),
                HINT_TTL,
            )
            .await;
            return Ok(());
        };

        let mention = texts::mention(target.id, &target.display_name);
        let notice = match self.transport.ban_member(msg.chat.id, target.id).await {
            Ok(()) => {
                info!(chat = msg.chat.id, target = target.id, "User banned by admin");
                texts::banned(&mention)
            }
            Err(e) => {
                warn!(chat = msg.chat.id, target = target.id, error = %e, "Ban failed");
                texts::BAN_FAILED.to_string()
            }
        };
        notices::send_transient(
            &self.transport,
            msg.chat.id,
            &notice,
            SendOptions::html(),
            RESULT_TTL,
        )
        .await;
        Ok(())
    }

    /// Resolve the `/unmute` target: reply beats an explicit argument; an
    /// argument is a numeric id or a username to look up.
    async fn resolve_unmute_target(
        &self,
        msg: &InboundMessage,
        arg: Option<&str>,
    ) -> Result<UnmuteTarget, PipelineError> {
        if let Some(target) = msg.reply_to.as_ref().and_then(|r| r.sender.clone()) {
            let mention = texts::mention(target.id, &target.display_name);
            return Ok(UnmuteTarget::Resolved(target.id, mention));
        }
        let Some(arg) = arg else {
            return Ok(UnmuteTarget::Missing);
        };

        if let Ok(id) = arg.parse::<UserId>() {
            return Ok(UnmuteTarget::Resolved(id, texts::mention(id, &id.to_string())));
        }
        match self.store.user_id_by_username(arg).await? {
            Some(id) => Ok(UnmuteTarget::Resolved(id, texts::escape_html(arg))),
            None => Ok(UnmuteTarget::UnknownUsername(arg.to_string())),
        }
    }

    async fn unmute_cmd(
        &self,
        msg: &InboundMessage,
        arg: Option<&str>,
    ) -> Result<(), PipelineError> {
        let (target, name) = match self.resolve_unmute_target(msg, arg).await? {
            UnmuteTarget::Resolved(id, name) => (id, name),
            UnmuteTarget::UnknownUsername(arg) => {
                notices::send_transient(
                    &self.transport,
                    msg.chat.id,
                    &texts::user_not_found(&arg),
                    SendOptions::html(),
                    RESULT_TTL,
                )
                .await;
                return Ok(());
            }
            UnmuteTarget::Missing => {
                notices::send_transient(
                    &self.transport,
                    msg.chat.id,
                    texts::UNMUTE_USAGE,
                    SendOptions::html(),
                    RESULT_TTL,
                )
                .await;
                return Ok(());
            }
        };

        let notice = match self.transport.unban_member(msg.chat.id, target).await {
            Ok(()) => {
                self.ledger.reset(target).await?;
                if let Err(e) = self
                    .transport
                    .restrict_member(msg.chat.id, target, MemberPermissions::unrestricted())
                    .await
                {
                    warn!(chat = msg.chat.id, target, error = %e, "Failed to restore permissions");
                }
                info!(chat = msg.chat.id, target, "User unmuted, warnings reset");
                texts::unmuted(&name)
            }
            Err(e) => {
                warn!(chat = msg.chat.id, target, error = %e, "Unban failed");
                texts::UNMUTE_FAILED.to_string()
            }
        };
        notices::send_transient(
            &self.transport,
            msg.chat.id,
            &notice,
            SendOptions::html(),
            RESULT_TTL,
        )
        .await;
        Ok(())
    }

    async fn addword_cmd(&self, msg: &InboundMessage, word: &str) -> Result<(), PipelineError> {
        let word = word.trim();
        if word.is_empty() {
            notices::send_transient(
                &self.transport,
                msg.chat.id,
                texts::ADDWORD_USAGE,
                SendOptions::default(),
                WORD_TTL,
            )
            .await;
            return Ok(());
        }

        let inserted = self.store.add_banned_word(word).await?;
        let notice = if inserted {
            info!(word, "Banned word added");
            texts::word_added(word)
        } else {
            texts::word_exists(word)
        };
        notices::send_transient(
            &self.transport,
            msg.chat.id,
            &notice,
            SendOptions::html(),
            WORD_TTL,
        )
        .await;
        Ok(())
    }

    async fn authorize_cmd(&self, msg: &InboundMessage) -> Result<(), PipelineError> {
        let newly = self
            .store
            .license_chat(msg.chat.id, &msg.chat.title)
            .await?;
        let notice = if newly {
            info!(chat = msg.chat.id, title = %msg.chat.title, "Chat licensed");
            texts::CHAT_LICENSED
        } else {
            texts::CHAT_ALREADY_LICENSED
        };
        // The licensing confirmation is the one response that stays.
        if let Err(e) = self
            .transport
            .send_message(msg.chat.id, notice, SendOptions::default())
            .await
        {
            warn!(chat = msg.chat.id, error = %e, "Failed to send license confirmation");
        }
        Ok(())
    }
}
