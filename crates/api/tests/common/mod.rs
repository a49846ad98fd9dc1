#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use slotkeeper_api::config::AppConfig;
use slotkeeper_api::engine::{CommandDispatcher, Inbound};
use slotkeeper_api::state::AppState;
use slotkeeper_events::{DeliveryError, Messenger};

/// Chat id used for group replies in tests.
pub const GROUP: &str = "-1001";

/// Messenger that records every outbound message instead of sending it.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    /// Recipients whose deliveries fail.
    failing: Mutex<Vec<String>>,
    deleted: Mutex<Vec<(String, i64)>>,
    fail_deletes: Mutex<bool>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages sent to `chat_id`, in order.
    pub fn sent_to(&self, chat_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn last_to(&self, chat_id: &str) -> Option<String> {
        self.sent_to(chat_id).pop()
    }

    pub fn fail_for(&self, chat_id: &str) {
        self.failing.lock().unwrap().push(chat_id.to_string());
    }

    /// Messages deleted so far, as `(chat_id, message_id)`.
    pub fn deleted(&self) -> Vec<(String, i64)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        if self.failing.lock().unwrap().iter().any(|f| f == chat_id) {
            return Err(DeliveryError::Api("Forbidden: bot was blocked by the user".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, message_id: i64) -> Result<(), DeliveryError> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(DeliveryError::Api(
                "Bad Request: message can't be deleted".into(),
            ));
        }
        self.deleted
            .lock()
            .unwrap()
            .push((chat_id.to_string(), message_id));
        Ok(())
    }
}

/// Build a test `AppConfig` with safe defaults.
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|var| match var {
        "BOT_TOKEN" => Some("test-token".to_string()),
        _ => None,
    })
    .expect("test config should load")
}

pub struct Harness {
    pub state: AppState,
    pub messenger: Arc<RecordingMessenger>,
    pub dispatcher: CommandDispatcher,
    next_message_id: AtomicI64,
}

impl Harness {
    pub fn new() -> Self {
        let messenger = Arc::new(RecordingMessenger::default());
        let state = AppState::new(test_config(), messenger.clone());
        let dispatcher = CommandDispatcher::new(&state);
        Self {
            state,
            messenger,
            dispatcher,
            next_message_id: AtomicI64::new(1),
        }
    }

    /// Send `text` to the group chat as `sender`.
    ///
    /// Message ids count up from 1 per harness.
    pub async fn say(&self, sender: &str, text: &str) {
        let inbound = Inbound {
            chat_id: GROUP.to_string(),
            sender: Some(sender.to_string()),
            message_id: Some(self.next_message_id.fetch_add(1, Ordering::Relaxed)),
        };
        self.dispatcher
            .handle(&inbound, text)
            .await
            .expect("command should not fail");
    }

    pub fn last_reply(&self) -> Option<String> {
        self.messenger.last_to(GROUP)
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
