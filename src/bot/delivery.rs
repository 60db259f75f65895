use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::{ApiError, RequestError};

use crate::config::{POLL_OPTIONS, POLL_QUESTION};

/// The fixed poll sent to every tracked group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
    /// Poll question text.
    pub question: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Whether votes are anonymous.
    pub anonymous: bool,
}

impl PollSpec {
    /// The daily availability poll. Identical for every destination in a run.
    pub fn daily() -> Self {
        Self {
            question: POLL_QUESTION.to_string(),
            options: POLL_OPTIONS.iter().map(|o| o.to_string()).collect(),
            anonymous: false,
        }
    }
}

/// Result of one delivery attempt, as a value rather than an error, so
/// callers classify outcomes with a plain match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The message or poll reached the chat.
    Delivered,
    /// The chat was migrated to a supergroup with the given id; the old id is
    /// dead and the new one must replace it in the store.
    Migrated(ChatId),
    /// The bot lost send rights, i.e. it was removed from the chat.
    Forbidden,
    /// Any other transport failure. Assumed transient: callers must not drop
    /// the destination over it.
    Other(String),
}

/// Outbound side of the Telegram transport, kept behind a trait so the
/// membership handler and the broadcast job can be driven by a test double.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempts one poll delivery to `chat_id`.
    async fn send_poll(&self, chat_id: ChatId, poll: &PollSpec) -> DeliveryOutcome;

    /// Attempts one MarkdownV2-formatted message delivery to `chat_id`.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> DeliveryOutcome;
}

/// Maps a teloxide request error onto a delivery outcome.
pub fn classify_request_error(err: &RequestError) -> DeliveryOutcome {
    match err {
        RequestError::MigrateToChatId(new_id) => DeliveryOutcome::Migrated(ChatId(*new_id)),
        RequestError::Api(
            ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup
            | ApiError::BotBlocked
            | ApiError::GroupDeactivated
            | ApiError::ChatNotFound,
        ) => DeliveryOutcome::Forbidden,
        other => DeliveryOutcome::Other(other.to_string()),
    }
}

/// Production transport backed by a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wraps a bot client.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_poll(&self, chat_id: ChatId, poll: &PollSpec) -> DeliveryOutcome {
        let result = self
            .bot
            .send_poll(chat_id, poll.question.clone(), poll.options.clone())
            .is_anonymous(poll.anonymous)
            .await;

        match result {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => classify_request_error(&e),
        }
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> DeliveryOutcome {
        let result = self
            .bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .await;

        match result {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => classify_request_error(&e),
        }
    }
}
