//! Long-poll update loop.
//!
//! Fetches updates, converts each into a pipeline event, and spawns one
//! task per event so no chat's processing blocks another's. Poll failures
//! back off briefly and continue; they never take the loop down.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::pipeline::ModerationPipeline;
use crate::pipeline::types::{ChatScope, InboundEvent, InboundMessage, MessageKind, ReplyRef, Sender};
use crate::telegram::api::TelegramApi;
use crate::telegram::types::{TgMessage, TgUser};

/// Backoff after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Drives the pipeline from the Bot API update stream.
pub struct UpdatePoller {
    api: Arc<TelegramApi>,
    pipeline: Arc<ModerationPipeline>,
    /// The bot's own user id, for recognizing the added-to-group event.
    bot_id: i64,
    poll_timeout_secs: u32,
}

impl UpdatePoller {
    pub fn new(
        api: Arc<TelegramApi>,
        pipeline: Arc<ModerationPipeline>,
        bot_id: i64,
        poll_timeout_secs: u32,
    ) -> Self {
        Self {
            api,
            pipeline,
            bot_id,
            poll_timeout_secs,
        }
    }

    /// Run the poll loop forever.
    pub async fn run(&self) {
        let mut offset: i64 = 0;
        info!("Listening for updates");

        loop {
            let updates = match self.api.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "Poll failed");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message else {
                    continue;
                };
                let Some(event) = to_event(message, self.bot_id) else {
                    continue;
                };

                // One task per update: a slow or failing handler never
                // stalls the stream or other chats.
                let pipeline = Arc::clone(&self.pipeline);
                tokio::spawn(async move {
                    pipeline.handle(event).await;
                });
            }
        }
    }
}

/// Convert a platform message into a pipeline event.
///
/// Returns `None` for updates the pipeline has no interest in (service
/// messages without a sender, member joins other than the bot's own).
fn to_event(message: TgMessage, bot_id: i64) -> Option<InboundEvent> {
    let chat = ChatScope {
        id: message.chat.id,
        title: message.chat.title.clone().unwrap_or_default(),
        is_group: message.chat.is_group(),
    };

    if message.new_chat_members.iter().any(|u| u.id == bot_id) {
        return Some(InboundEvent::BotJoinedChat { chat });
    }
    if !message.new_chat_members.is_empty() {
        return None;
    }

    let from = message.from.as_ref()?;
    if from.is_bot {
        return None;
    }

    let kind = if message.has_media() {
        MessageKind::Media
    } else {
        MessageKind::Text
    };

    let reply_to = message.reply_to_message.as_deref().map(|replied| ReplyRef {
        message: replied.message_id,
        sender: replied.from.as_ref().map(to_sender),
    });

    Some(InboundEvent::Message(InboundMessage {
        chat,
        sender: to_sender(from),
        message: message.message_id,
        kind,
        has_url_entity: message.has_url_entity(),
        text: message.text,
        caption: message.caption,
        reply_to,
    }))
}

fn to_sender(user: &TgUser) -> Sender {
    Sender {
        id: user.id,
        username: user.username.clone(),
        display_name: user.first_name.clone(),
    }
}
