use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use daily_poll_bot::bot::delivery::{DeliveryOutcome, PollSpec, Transport};
use teloxide::types::ChatId;

/// One recorded delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Poll(ChatId),
    Message(ChatId, String),
}

/// Transport double with per-chat scripted outcomes and a full send log.
/// Chats without a script succeed.
#[derive(Default)]
pub struct ScriptedTransport {
    poll_outcomes: HashMap<i64, DeliveryOutcome>,
    message_outcomes: HashMap<i64, DeliveryOutcome>,
    sent: Mutex<Vec<Sent>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_outcome(mut self, chat_id: i64, outcome: DeliveryOutcome) -> Self {
        self.poll_outcomes.insert(chat_id, outcome);
        self
    }

    pub fn message_outcome(mut self, chat_id: i64, outcome: DeliveryOutcome) -> Self {
        self.message_outcomes.insert(chat_id, outcome);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn poll_attempts(&self, chat_id: i64) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Poll(id) if id.0 == chat_id))
            .count()
    }

    pub fn message_attempts(&self, chat_id: i64) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Message(id, _) if id.0 == chat_id))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_poll(&self, chat_id: ChatId, _poll: &PollSpec) -> DeliveryOutcome {
        self.sent.lock().unwrap().push(Sent::Poll(chat_id));
        self.poll_outcomes
            .get(&chat_id.0)
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered)
    }

    async fn send_message(&self, chat_id: ChatId, text: &str) -> DeliveryOutcome {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Message(chat_id, text.to_string()));
        self.message_outcomes
            .get(&chat_id.0)
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered)
    }
}
