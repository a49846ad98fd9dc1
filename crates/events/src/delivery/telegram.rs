//! Telegram Bot API client.
//!
//! [`TelegramClient`] implements [`Messenger`] through `sendMessage` and
//! `deleteMessage`, and exposes `getUpdates` long polling for the inbound
//! side.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::messenger::{DeliveryError, Messenger};

/// Default Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Extra headroom on top of the long-poll timeout for the HTTP request.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

impl User {
    /// The sender's messaging identity, `@username`, if they have one.
    pub fn identity(&self) -> Option<String> {
        self.username.as_ref().map(|u| format!("@{u}"))
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteMessageRequest<'a> {
    chat_id: &'a str,
    message_id: i64,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

// ---------------------------------------------------------------------------
// TelegramClient
// ---------------------------------------------------------------------------

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Create a client for `token` against `api_url`.
    ///
    /// `poll_timeout` is the server-side long-poll wait used by
    /// [`get_updates`](Self::get_updates).
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + REQUEST_SLACK)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            poll_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Long-poll for new message updates starting at `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, DeliveryError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, DeliveryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let envelope: ApiResponse<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(DeliveryError::HttpStatus(status.as_u16()))
            }
            Err(e) => return Err(e.into()),
        };

        unwrap_envelope(envelope, status.as_u16())
    }
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>, status: u16) -> Result<T, DeliveryError> {
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            description: Some(description),
            ..
        } => Err(DeliveryError::Api(description)),
        _ => Err(DeliveryError::HttpStatus(status)),
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        tracing::debug!(chat_id, "Message sent");
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, message_id: i64) -> Result<(), DeliveryError> {
        let _: bool = self
            .call("deleteMessage", &DeleteMessageRequest { chat_id, message_id })
            .await?;
        tracing::debug!(chat_id, message_id, "Message deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
