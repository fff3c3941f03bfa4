//! Bot API client — implements the `Transport` seam over reqwest.
//!
//! Thin and mechanical: build the method URL, post JSON, check the
//! `{ok, result, description}` envelope. No retries; callers decide what a
//! failure means.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::telegram::types::{ApiEnvelope, TgChatMember, TgMessageRef, TgUpdate, TgUser};
use crate::transport::{
    ChatId, MemberPermissions, MemberRole, MessageId, MessageRef, SendOptions, Transport, UserId,
};

const API_BASE: &str = "https://api.telegram.org";

/// Bot API client.
pub struct TelegramApi {
    token: SecretString,
    client: reqwest::Client,
}

impl TelegramApi {
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token.expose_secret())
    }

    /// Post a method call and unwrap the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        if !envelope.ok {
            return Err(TransportError::Api {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope.result.ok_or_else(|| TransportError::InvalidResponse {
            method: method.to_string(),
            reason: "ok response without result".to_string(),
        })
    }

    /// The bot's own identity; the poller needs it to recognize the
    /// added-to-group event.
    pub async fn get_me(&self) -> Result<TgUser, TransportError> {
        self.call("getMe", serde_json::json!({})).await
    }

    /// Long-poll for updates past `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u32,
    ) -> Result<Vec<TgUpdate>, TransportError> {
        self.call(
            "getUpdates",
            serde_json::json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}

fn role_from_status(status: &str) -> MemberRole {
    match status {
        "creator" => MemberRole::Owner,
        "administrator" => MemberRole::Administrator,
        "member" => MemberRole::Member,
        "restricted" => MemberRole::Restricted,
        "left" => MemberRole::Left,
        "kicked" => MemberRole::Banned,
        _ => MemberRole::Unknown,
    }
}

#[async_trait]
impl Transport for TelegramApi {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        opts: SendOptions,
    ) -> Result<MessageRef, TransportError> {
        let mut body = serde_json::json!({
            "chat_id": chat,
            "text": text,
        });
        if opts.html {
            body["parse_mode"] = "HTML".into();
        }
        if let Some(reply_to) = opts.reply_to {
            body["reply_parameters"] = serde_json::json!({ "message_id": reply_to });
        }
        let sent: TgMessageRef = self.call("sendMessage", body).await?;
        Ok(MessageRef {
            chat,
            message: sent.message_id,
        })
    }

    async fn delete_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteMessage",
                serde_json::json!({ "chat_id": chat, "message_id": message }),
            )
            .await?;
        Ok(())
    }

    async fn forward_message(
        &self,
        to: ChatId,
        from: ChatId,
        message: MessageId,
    ) -> Result<MessageRef, TransportError> {
        let sent: TgMessageRef = self
            .call(
                "forwardMessage",
                serde_json::json!({
                    "chat_id": to,
                    "from_chat_id": from,
                    "message_id": message,
                }),
            )
            .await?;
        Ok(MessageRef {
            chat: to,
            message: sent.message_id,
        })
    }

    async fn copy_message(
        &self,
        to: ChatId,
        from: ChatId,
        message: MessageId,
        caption: Option<&str>,
    ) -> Result<MessageRef, TransportError> {
        let mut body = serde_json::json!({
            "chat_id": to,
            "from_chat_id": from,
            "message_id": message,
        });
        if let Some(caption) = caption {
            body["caption"] = caption.into();
            body["parse_mode"] = "HTML".into();
        }
        let sent: TgMessageRef = self.call("copyMessage", body).await?;
        Ok(MessageRef {
            chat: to,
            message: sent.message_id,
        })
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "banChatMember",
                serde_json::json!({ "chat_id": chat, "user_id": user }),
            )
            .await?;
        Ok(())
    }

    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<(), TransportError> {
        // only_if_banned keeps this from kicking a present member.
        let _: bool = self
            .call(
                "unbanChatMember",
                serde_json::json!({ "chat_id": chat, "user_id": user, "only_if_banned": true }),
            )
            .await?;
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "restrictChatMember",
                serde_json::json!({
                    "chat_id": chat,
                    "user_id": user,
                    "permissions": {
                        "can_send_messages": permissions.can_send_messages,
                        "can_send_photos": permissions.can_send_media,
                        "can_send_videos": permissions.can_send_media,
                        "can_send_other_messages": permissions.can_send_media,
                        "can_send_polls": permissions.can_send_polls,
                        "can_add_web_page_previews": permissions.can_add_web_page_previews,
                    },
                }),
            )
            .await?;
        Ok(())
    }

    async fn member_role(
        &self,
        chat: ChatId,
        user: UserId,
    ) -> Result<MemberRole, TransportError> {
        let member: TgChatMember = self
            .call(
                "getChatMember",
                serde_json::json!({ "chat_id": chat, "user_id": user }),
            )
            .await?;
        Ok(role_from_status(&member.status))
    }

    async fn leave_chat(&self, chat: ChatId) -> Result<(), TransportError> {
        let _: bool = self
            .call("leaveChat", serde_json::json!({ "chat_id": chat }))
            .await?;
        Ok(())
    }
}
