//! Outbound primitives: send text to a messaging identity, and tidy up
//! command messages in the chat.

use async_trait::async_trait;

/// Error type for outbound message delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Messaging API returned HTTP {0}")]
    HttpStatus(u16),

    /// The API answered but reported a failure.
    #[error("Messaging API error: {0}")]
    Api(String),
}

/// Outbound text delivery, used for command replies and restore notifications.
///
/// `chat_id` is whatever the channel accepts as an address: a numeric chat
/// id or an `@username`.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError>;

    /// Delete a message previously posted in `chat_id`.
    async fn delete_message(&self, chat_id: &str, message_id: i64) -> Result<(), DeliveryError>;
}
