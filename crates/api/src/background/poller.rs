//! Telegram long-poll loop.
//!
//! Fetches updates with `getUpdates`, acknowledges them by advancing the
//! offset, and hands each text message to the [`CommandDispatcher`] one at a
//! time, in arrival order.

use std::sync::Arc;
use std::time::Duration;

use slotkeeper_events::delivery::telegram::Update;
use slotkeeper_events::TelegramClient;
use tokio_util::sync::CancellationToken;

use crate::engine::{CommandDispatcher, Inbound};

/// Delay before retrying after a failed poll.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run the poll loop until `cancel` is triggered.
pub async fn run(
    client: Arc<TelegramClient>,
    dispatcher: Arc<CommandDispatcher>,
    cancel: CancellationToken,
) {
    tracing::info!("Update poller started");
    let mut offset: Option<i64> = None;

    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => break,
            polled = client.get_updates(offset) => polled,
        };

        match polled {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!(count = updates.len(), "Received updates");
                }
                for update in updates {
                    offset = Some(update.update_id + 1);
                    let Some((inbound, text)) = inbound_message(&update) else {
                        continue;
                    };
                    if let Err(e) = dispatcher.handle(&inbound, &text).await {
                        tracing::error!(
                            chat_id = %inbound.chat_id,
                            error = %e,
                            "Failed to handle command"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Polling for updates failed");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }

    tracing::info!("Update poller stopped");
}

/// Extract the chat, sender identity and text of a message update.
pub fn inbound_message(update: &Update) -> Option<(Inbound, String)> {
    let message = update.message.as_ref()?;
    let text = message.text.clone()?;

    let inbound = Inbound {
        chat_id: message.chat.id.to_string(),
        sender: message.from.as_ref().and_then(|u| u.identity()),
        message_id: Some(message.message_id),
    };
    Some((inbound, text))
}
