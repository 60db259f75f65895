/// Membership-change handling for the bot's own chat member status
pub mod chat_member;
/// Dispatch-loop error policy
pub mod error;

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::ChatMemberUpdated;

use crate::bot::delivery::Transport;
use crate::storage::GroupStore;

/// Builds the update-dispatch schema over the store and transport.
pub struct BotHandler {
    store: GroupStore,
    transport: Arc<dyn Transport>,
}

impl BotHandler {
    /// Creates the handler over the shared store and transport.
    pub fn new(store: GroupStore, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport }
    }

    /// The dptree schema: only `my_chat_member` updates are handled, since
    /// membership changes are the bot's sole inbound interest.
    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let store = self.store.clone();
        let transport = self.transport.clone();

        Update::filter_my_chat_member().endpoint(move |update: ChatMemberUpdated| {
            let store = store.clone();
            let transport = transport.clone();
            async move {
                chat_member::handle_chat_member_update(update, store, transport)
                    .await
                    .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
            }
        })
    }
}
