use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, ChatMemberUpdated};
use tracing::{debug, info, warn};

use crate::bot::delivery::{DeliveryOutcome, Transport};
use crate::storage::{GroupStore, StoreError};
use crate::utils::markdown::escape_markdown;

/// The bot's own status in a chat, as reported by a chat-member update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    /// Chat owner.
    Owner,
    /// Administrator.
    Administrator,
    /// Ordinary member.
    Member,
    /// Present but restricted.
    Restricted,
    /// Left the chat on its own.
    Left,
    /// Kicked/banned from the chat.
    Kicked,
}

impl MemberStatus {
    /// True for statuses that mean the bot can participate in the chat.
    pub fn is_joined(self) -> bool {
        matches!(self, Self::Owner | Self::Administrator | Self::Member)
    }

    /// True for statuses that mean the bot is out of the chat.
    pub fn is_gone(self) -> bool {
        matches!(self, Self::Left | Self::Kicked)
    }

    /// Maps a teloxide chat-member kind onto the bot's status.
    pub fn from_kind(kind: &ChatMemberKind) -> Self {
        if kind.is_owner() {
            Self::Owner
        } else if kind.is_administrator() {
            Self::Administrator
        } else if kind.is_member() {
            Self::Member
        } else if kind.is_restricted() {
            Self::Restricted
        } else if kind.is_banned() {
            Self::Kicked
        } else {
            Self::Left
        }
    }
}

// Literal MarkdownV2 specials in the fixed text are pre-escaped; only the
// user-controlled title goes through escape_markdown.
fn welcome_text(title: &str) -> String {
    format!(
        "👋 Hello, *{}*\\!\n\
         I'll be sending the daily poll here from now on\\. \
         Please check that I have the *\"Create polls\"* permission\\.",
        escape_markdown(title)
    )
}

fn migration_text(new_id: ChatId) -> String {
    format!("✅ Group updated\\! New chat id: `{}`", new_id)
}

/// Applies one membership transition to the store and sends the best-effort
/// confirmation messages.
///
/// The store mutation is committed before any message is attempted and is
/// never rolled back when a send fails; message delivery is purely cosmetic
/// next to the membership list staying truthful.
pub async fn handle_transition(
    transport: &dyn Transport,
    store: &GroupStore,
    chat_id: ChatId,
    title: &str,
    old: MemberStatus,
    new: MemberStatus,
) -> Result<(), StoreError> {
    if old.is_gone() && new.is_joined() {
        info!("Bot joined group {} ({:?} -> {:?})", chat_id, old, new);
        store.add(chat_id)?;

        match transport.send_message(chat_id, &welcome_text(title)).await {
            DeliveryOutcome::Delivered => {}
            DeliveryOutcome::Migrated(new_id) => {
                warn!("Chat migrated to supergroup: {} -> {}", chat_id, new_id);
                store.remove(chat_id)?;
                store.add(new_id)?;
                let confirm = transport.send_message(new_id, &migration_text(new_id)).await;
                if confirm != DeliveryOutcome::Delivered {
                    warn!("Migration confirmation to {} failed: {:?}", new_id, confirm);
                }
            }
            DeliveryOutcome::Forbidden => {
                warn!("Welcome message to {} forbidden; keeping store entry", chat_id);
            }
            DeliveryOutcome::Other(detail) => {
                warn!("Welcome message to {} failed: {}", chat_id, detail);
            }
        }
    } else if old.is_joined() && new.is_gone() {
        // Proactive removal; the broadcast loop would also drop the chat on
        // its next Forbidden outcome, but there is no reason to wait.
        info!("Bot left group {} ({:?} -> {:?})", chat_id, old, new);
        store.remove(chat_id)?;
    } else {
        debug!(
            "Ignoring membership transition for {}: {:?} -> {:?}",
            chat_id, old, new
        );
    }

    Ok(())
}

/// Endpoint for `my_chat_member` updates about the bot itself.
pub async fn handle_chat_member_update(
    update: ChatMemberUpdated,
    store: GroupStore,
    transport: std::sync::Arc<dyn Transport>,
) -> Result<(), StoreError> {
    let chat_id = update.chat.id;
    let title = update.chat.title().unwrap_or("Untitled").to_string();
    let old = MemberStatus::from_kind(&update.old_chat_member.kind);
    let new = MemberStatus::from_kind(&update.new_chat_member.kind);

    handle_transition(transport.as_ref(), &store, chat_id, &title, old, new).await
}
