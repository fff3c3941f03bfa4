//! End-to-end moderation flows through the public crate API.
//!
//! A recording stub stands in for the chat platform; the store is the real
//! libSQL backend in memory. Each test drives the pipeline with inbound
//! events exactly as the poller would.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use chat_warden::error::TransportError;
use chat_warden::pipeline::ModerationPipeline;
use chat_warden::pipeline::types::{
    ChatScope, InboundEvent, InboundMessage, MessageKind, ReplyRef, Sender,
};
use chat_warden::store::{LibSqlStore, ModerationStore};
use chat_warden::transport::{
    ChatId, MemberPermissions, MemberRole, MessageId, MessageRef, SendOptions, Transport, UserId,
};

const OWNER: UserId = 42;
const GROUP: ChatId = -1001;

/// Side effects the platform was asked to perform.
#[derive(Debug, Clone, PartialEq)]
enum Effect {
    Sent(ChatId, String),
    Deleted(ChatId, MessageId),
    Forwarded { to: ChatId, produced: MessageId },
    Copied(ChatId),
    Banned(ChatId, UserId),
    Unbanned(ChatId, UserId),
    Restricted(ChatId, UserId),
    Left(ChatId),
}

#[derive(Default)]
struct FakePlatform {
    effects: Mutex<Vec<Effect>>,
    counter: Mutex<i64>,
}

impl FakePlatform {
    fn push(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }

    fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    fn next_id(&self) -> i64 {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        5000 + *counter
    }

    fn texts_in(&self, chat: ChatId) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Sent(c, text) if c == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    fn forwarded_to_owner(&self) -> Option<MessageId> {
        self.effects().into_iter().find_map(|e| match e {
            Effect::Forwarded { to, produced } if to == OWNER => Some(produced),
            _ => None,
        })
    }
}

#[async_trait]
impl Transport for FakePlatform {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        _opts: SendOptions,
    ) -> Result<MessageRef, TransportError> {
        self.push(Effect::Sent(chat, text.to_string()));
        Ok(MessageRef {
            chat,
            message: self.next_id(),
        })
    }

    async fn delete_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        self.push(Effect::Deleted(chat, message));
        Ok(())
    }

    async fn forward_message(
        &self,
        to: ChatId,
        _from: ChatId,
        _message: MessageId,
    ) -> Result<MessageRef, TransportError> {
        let produced = self.next_id();
        self.push(Effect::Forwarded { to, produced });
        Ok(MessageRef {
            chat: to,
            message: produced,
        })
    }

    async fn copy_message(
        &self,
        to: ChatId,
        _from: ChatId,
        _message: MessageId,
        _caption: Option<&str>,
    ) -> Result<MessageRef, TransportError> {
        self.push(Effect::Copied(to));
        Ok(MessageRef {
            chat: to,
            message: self.next_id(),
        })
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), TransportError> {
        self.push(Effect::Banned(chat, user));
        Ok(())
    }

    async fn unban_member(&self, chat: ChatId, user: UserId) -> Result<(), TransportError> {
        self.push(Effect::Unbanned(chat, user));
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat: ChatId,
        user: UserId,
        _permissions: MemberPermissions,
    ) -> Result<(), TransportError> {
        self.push(Effect::Restricted(chat, user));
        Ok(())
    }

    async fn member_role(
        &self,
        _chat: ChatId,
        _user: UserId,
    ) -> Result<MemberRole, TransportError> {
        Ok(MemberRole::Member)
    }

    async fn leave_chat(&self, chat: ChatId) -> Result<(), TransportError> {
        self.push(Effect::Left(chat));
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (Arc<FakePlatform>, Arc<LibSqlStore>, Arc<ModerationPipeline>) {
    let platform = Arc::new(FakePlatform::default());
    let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
    store.license_chat(GROUP, "بازار کار").await.unwrap();
    let pipeline = Arc::new(ModerationPipeline::new(
        Arc::clone(&platform) as Arc<dyn Transport>,
        Arc::clone(&store) as Arc<dyn ModerationStore>,
        OWNER,
    ));
    (platform, store, pipeline)
}

fn user(id: UserId) -> Sender {
    Sender {
        id,
        username: Some(format!("member{id}")),
        display_name: format!("Member {id}"),
    }
}

fn text_in_group(message: MessageId, from: UserId, text: &str) -> InboundEvent {
    InboundEvent::Message(InboundMessage {
        chat: ChatScope {
            id: GROUP,
            title: "بازار کار".into(),
            is_group: true,
        },
        sender: user(from),
        message,
        kind: MessageKind::Text,
        text: Some(text.into()),
        caption: None,
        has_url_entity: false,
        reply_to: None,
    })
}

fn media_in_group(message: MessageId, from: UserId) -> InboundEvent {
    InboundEvent::Message(InboundMessage {
        chat: ChatScope {
            id: GROUP,
            title: "بازار کار".into(),
            is_group: true,
        },
        sender: user(from),
        message,
        kind: MessageKind::Media,
        text: None,
        caption: None,
        has_url_entity: false,
        reply_to: None,
    })
}

fn owner_reply(to_message: MessageId, text: &str) -> InboundEvent {
    InboundEvent::Message(InboundMessage {
        chat: ChatScope {
            id: OWNER,
            title: String::new(),
            is_group: false,
        },
        sender: user(OWNER),
        message: 9999,
        kind: MessageKind::Text,
        text: Some(text.into()),
        caption: None,
        has_url_entity: false,
        reply_to: Some(ReplyRef {
            message: to_message,
            sender: None,
        }),
    })
}

// ── Scenarios ───────────────────────────────────────────────────────

/// The reference scenario: a member advertises a link three times and is
/// suspended on the third strike.
#[tokio::test]
async fn three_link_strikes_suspend_the_sender() {
    let (platform, store, pipeline) = setup().await;

    pipeline
        .handle(text_in_group(101, 7, "یه فایل رایگان اینجا www.example.com"))
        .await;
    assert!(platform.effects().contains(&Effect::Deleted(GROUP, 101)));
    assert_eq!(store.warning_count(7).await.unwrap(), 1);
    assert!(platform.texts_in(GROUP).last().unwrap().contains("1/3"));

    pipeline
        .handle(text_in_group(102, 7, "بیا اینجا t.me/freebees"))
        .await;
    assert_eq!(store.warning_count(7).await.unwrap(), 2);
    assert!(platform.texts_in(GROUP).last().unwrap().contains("2/3"));

    pipeline
        .handle(text_in_group(103, 7, "آخرین فرصت site .com"))
        .await;
    assert_eq!(store.warning_count(7).await.unwrap(), 3);
    assert!(platform.effects().contains(&Effect::Banned(GROUP, 7)));
    assert!(
        platform.texts_in(GROUP).last().unwrap().contains("مسدود شد"),
        "third notice announces the suspension instead of a count"
    );
}

/// A banned-then-unmuted member posts again with a clean slate.
#[tokio::test]
async fn unmute_gives_a_clean_slate() {
    let (platform, store, pipeline) = setup().await;

    for message in [201, 202, 203] {
        pipeline
            .handle(text_in_group(message, 8, "bit.ly/xyz"))
            .await;
    }
    assert!(platform.effects().contains(&Effect::Banned(GROUP, 8)));
    assert_eq!(store.warning_count(8).await.unwrap(), 3);

    // Owner unmutes by replying to one of the old messages.
    let mut unmute = text_in_group(204, OWNER, "/unmute");
    if let InboundEvent::Message(ref mut msg) = unmute {
        msg.reply_to = Some(ReplyRef {
            message: 203,
            sender: Some(user(8)),
        });
    }
    pipeline.handle(unmute).await;

    assert!(platform.effects().contains(&Effect::Unbanned(GROUP, 8)));
    assert!(platform.effects().contains(&Effect::Restricted(GROUP, 8)));
    assert_eq!(store.warning_count(8).await.unwrap(), 0);

    // A fresh violation starts counting from one again.
    pipeline
        .handle(text_in_group(205, 8, "bit.ly/xyz"))
        .await;
    assert_eq!(store.warning_count(8).await.unwrap(), 1);
    assert!(!platform
        .effects()
        .iter()
        .skip_while(|e| **e != Effect::Unbanned(GROUP, 8))
        .any(|e| matches!(e, Effect::Banned(_, 8))));
}

/// Media quarantine and approval across unrelated chats.
#[tokio::test]
async fn media_approval_round_trip() {
    let (platform, store, pipeline) = setup().await;

    pipeline.handle(media_in_group(301, 9)).await;

    let forwarded = platform.forwarded_to_owner().expect("media forwarded");
    assert!(platform.effects().contains(&Effect::Deleted(GROUP, 301)));
    assert!(
        platform
            .texts_in(GROUP)
            .iter()
            .any(|t| t.contains("برای بررسی ارسال شد")),
        "group told the file went to review"
    );

    pipeline.handle(owner_reply(forwarded, "تایید")).await;
    assert!(platform.effects().contains(&Effect::Copied(GROUP)));

    // The decision is final: replaying it finds nothing.
    pipeline.handle(owner_reply(forwarded, "رد")).await;
    assert!(
        platform
            .texts_in(OWNER)
            .iter()
            .any(|t| t.contains("یافت نشد")),
        "second decision answered with not-found"
    );
    assert!(
        store.take_pending_approval(forwarded).await.unwrap().is_none(),
        "entry long gone"
    );
}

/// Messages in unlicensed groups trigger departure, never moderation.
#[tokio::test]
async fn unlicensed_group_is_left_once() {
    let (platform, store, pipeline) = setup().await;

    let event = InboundEvent::Message(InboundMessage {
        chat: ChatScope {
            id: -2002,
            title: "ناشناس".into(),
            is_group: true,
        },
        sender: user(3),
        message: 401,
        kind: MessageKind::Text,
        text: Some("t.me/spam".into()),
        caption: None,
        has_url_entity: false,
        reply_to: None,
    });
    pipeline.handle(event).await;

    assert!(platform.effects().contains(&Effect::Left(-2002)));
    let notices = platform.texts_in(-2002);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("-2002"), "chat id included for the operator");
    assert_eq!(store.warning_count(3).await.unwrap(), 0, "no matching ran");
}
