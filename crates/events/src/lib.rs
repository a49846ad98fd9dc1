//! Slotkeeper outbound side: restore timers and message delivery.
//!
//! - [`Messenger`]: the single "send text to identity" primitive.
//! - [`RestoreScheduler`]: one-shot delayed restore notifications.
//! - [`delivery::telegram`]: Telegram Bot API client (`sendMessage`,
//!   `getUpdates`).

pub mod delivery;
pub mod messenger;
pub mod scheduler;

pub use delivery::telegram::TelegramClient;
pub use messenger::{DeliveryError, Messenger};
pub use scheduler::{restore_message, RestoreScheduler, SharedRoster};
