//! One-shot restore notifications for timed-building entries.
//!
//! Every [`PendingRestore`] becomes its own tracked Tokio task that sleeps
//! until the expiry and then messages the owner. Tasks are fire-and-forget:
//! they are not linked to the entry they came from, are never cancelled, and
//! a re-timed entry therefore notifies once per schedule.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use slotkeeper_core::{PendingRestore, Roster};
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;

use crate::messenger::Messenger;

/// The one lock guarding all bot state.
pub type SharedRoster = Arc<Mutex<Roster>>;

/// Notification text sent when a timed entry's cooldown elapses.
pub fn restore_message(identity: &str) -> String {
    format!("{identity} car restored")
}

pub struct RestoreScheduler {
    roster: SharedRoster,
    messenger: Arc<dyn Messenger>,
    tracker: TaskTracker,
}

impl RestoreScheduler {
    pub fn new(roster: SharedRoster, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            roster,
            messenger,
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn a delayed notification for `restore`.
    ///
    /// An expiry in the past fires immediately. Must be called from within
    /// a Tokio runtime, and never while holding the roster lock.
    pub fn schedule(&self, restore: PendingRestore) {
        let delay = (restore.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);

        tracing::debug!(
            player = %restore.owner,
            delay_secs = delay.as_secs(),
            in_flight = self.tracker.len() + 1,
            "Restore notification scheduled"
        );

        let roster = Arc::clone(&self.roster);
        let messenger = Arc::clone(&self.messenger);
        self.tracker.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            notify_owner(&roster, messenger.as_ref(), &restore.owner).await;
        });
    }

    pub fn schedule_all(&self, restores: impl IntoIterator<Item = PendingRestore>) {
        for restore in restores {
            self.schedule(restore);
        }
    }

    /// Number of restore tasks that have not fired yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the tracker and wait up to `timeout` for outstanding tasks.
    ///
    /// Returns `true` if all of them completed. Tasks still sleeping when
    /// the process exits are lost; nothing is persisted.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}

/// Look up the owner's current identity and send the restore message.
///
/// The owner may have been removed or re-registered since scheduling; the
/// identity is read at fire time and a missing owner skips the send.
async fn notify_owner(roster: &SharedRoster, messenger: &dyn Messenger, owner: &str) {
    let identity = roster.lock().await.identity_of(owner).map(str::to_string);

    let Some(identity) = identity else {
        tracing::warn!(player = owner, "Restore owner no longer registered, notification dropped");
        return;
    };

    match messenger
        .send_text(&identity, &restore_message(&identity))
        .await
    {
        Ok(()) => tracing::info!(player = owner, identity = %identity, "Restore notification sent"),
        Err(e) => tracing::warn!(
            player = owner,
            identity = %identity,
            error = %e,
            "Restore notification failed"
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
