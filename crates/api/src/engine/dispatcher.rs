//! Chat command dispatcher.
//!
//! Maps parsed [`Command`]s onto [`Roster`](slotkeeper_core::Roster)
//! operations. The roster lock is held only for the mutation itself; replies
//! are sent and restore timers scheduled after it is released.

use std::sync::Arc;

use chrono::Utc;
use slotkeeper_core::adjust::TimerAdjustment;
use slotkeeper_core::commands::HELP_TEXT;
use slotkeeper_core::positions::PositionPattern;
use slotkeeper_core::roster::AdjustOutcome;
use slotkeeper_core::types::Identity;
use slotkeeper_core::{Building, Command, ParseError};
use slotkeeper_events::{Messenger, RestoreScheduler, SharedRoster};

use crate::error::AppResult;
use crate::state::AppState;

/// Reply to `/call` when there is nobody to call.
pub const NO_PLAYERS: &str = "No players registered";

/// Where a message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Chat the message was posted in; replies go here.
    pub chat_id: String,
    /// Sender's messaging identity, if the channel provides one.
    pub sender: Option<Identity>,
    /// Id of the command message itself within `chat_id`.
    pub message_id: Option<i64>,
}

pub struct CommandDispatcher {
    roster: SharedRoster,
    scheduler: Arc<RestoreScheduler>,
    messenger: Arc<dyn Messenger>,
}

impl CommandDispatcher {
    pub fn new(state: &AppState) -> Self {
        Self {
            roster: Arc::clone(&state.roster),
            scheduler: Arc::clone(&state.scheduler),
            messenger: Arc::clone(&state.messenger),
        }
    }

    /// Parse and execute one inbound message.
    ///
    /// Non-commands and unknown commands are ignored; malformed commands get
    /// a usage reply.
    pub async fn handle(&self, inbound: &Inbound, text: &str) -> AppResult<()> {
        match Command::parse(text) {
            Ok(command) => self.execute(inbound, command).await,
            Err(ParseError::Usage(usage)) => self.reply(inbound, &format!("Usage: {usage}")).await,
            Err(e) => {
                tracing::debug!(chat_id = %inbound.chat_id, error = %e, "Ignoring message");
                Ok(())
            }
        }
    }

    pub async fn execute(&self, inbound: &Inbound, command: Command) -> AppResult<()> {
        match command {
            Command::Help => {
                self.delete_invoking(inbound).await;
                self.reply(inbound, HELP_TEXT).await
            }
            Command::Register { name, identity } => {
                self.roster.lock().await.register(&name, &identity);
                self.reply(inbound, &format!("Registered {name} as {identity}"))
                    .await
            }
            Command::Remove { name } => {
                let removal = self.roster.lock().await.remove(&name);
                let text = if removal.was_registered {
                    format!("Removed {name}")
                } else {
                    format!("{name} is not registered")
                };
                self.reply(inbound, &text).await
            }
            Command::Reset => {
                self.roster.lock().await.reset_all();
                self.reply(inbound, "All buildings reset").await
            }
            Command::List => {
                let text = self.roster.lock().await.render_all(Utc::now());
                self.reply(inbound, &text).await
            }
            Command::ListBuilding(building) => {
                let text = self
                    .roster
                    .lock()
                    .await
                    .render_building(building, Utc::now());
                self.reply(inbound, &text).await
            }
            Command::Positional {
                pattern,
                on_behalf_of,
            } => {
                let identity = on_behalf_of.or_else(|| inbound.sender.clone());
                self.submit_pattern(identity.as_deref(), &pattern).await
            }
            Command::AssignBuilding { building, names } => {
                self.assign(inbound, building, &names).await
            }
            Command::Call { text } => self.call(inbound, text.as_deref()).await,
            Command::Xall { text } => self.broadcast_private(inbound, &text).await,
            Command::AdjustTimers(adjustment) => self.adjust_timers(inbound, &adjustment).await,
        }
    }

    async fn reply(&self, inbound: &Inbound, text: &str) -> AppResult<()> {
        self.messenger.send_text(&inbound.chat_id, text).await?;
        Ok(())
    }

    /// Remove the command message from the chat. Needs delete rights, so a
    /// failure is only logged.
    async fn delete_invoking(&self, inbound: &Inbound) {
        let Some(message_id) = inbound.message_id else {
            return;
        };
        if let Err(e) = self.messenger.delete_message(&inbound.chat_id, message_id).await {
            tracing::warn!(chat_id = %inbound.chat_id, message_id, error = %e, "Failed to delete command message");
        }
    }

    /// Resolve the acting player for `identity`, logging when there is none.
    async fn acting_player(&self, identity: Option<&str>) -> Option<String> {
        let Some(identity) = identity else {
            tracing::debug!("Sender has no identity, ignoring");
            return None;
        };
        let player = self.roster.lock().await.require_player(identity);
        match player {
            Ok(player) => Some(player),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring command from unregistered sender");
                None
            }
        }
    }

    async fn submit_pattern(
        &self,
        identity: Option<&str>,
        pattern: &PositionPattern,
    ) -> AppResult<()> {
        let Some(player) = self.acting_player(identity).await else {
            return Ok(());
        };

        // Resolve and mutate under one lock acquisition; the player may have
        // been removed since `acting_player` released it.
        let report = {
            let mut roster = self.roster.lock().await;
            match roster.submit_pattern(&player, pattern, Utc::now()) {
                Ok(report) => report,
                Err(e) => {
                    tracing::debug!(error = %e, "Positional command dropped");
                    return Ok(());
                }
            }
        };

        if report.resolved.is_empty() {
            tracing::debug!(player = %player, pattern = pattern.as_str(), "Pattern resolved to nothing");
        }
        self.scheduler.schedule_all(report.pending);
        Ok(())
    }

    async fn assign(&self, inbound: &Inbound, building: Building, names: &[String]) -> AppResult<()> {
        let report = self
            .roster
            .lock()
            .await
            .assign_to_building(building, names, Utc::now());
        self.scheduler.schedule_all(report.pending);

        if !report.unknown.is_empty() {
            tracing::debug!(%building, unknown = ?report.unknown, "Unknown players skipped");
        }
        if report.assigned.is_empty() {
            return Ok(());
        }

        let text = format!("Building {building}: added {}", report.assigned.join(", "));
        self.reply(inbound, &text).await
    }

    async fn call(&self, inbound: &Inbound, text: Option<&str>) -> AppResult<()> {
        let identities = self.roster.lock().await.identities();

        let mut message = identities.join(" ");
        if let Some(text) = text {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(text);
        }
        if message.is_empty() {
            message = NO_PLAYERS.to_string();
        }

        self.reply(inbound, &message).await
    }

    /// Send `text` privately to every registered player.
    ///
    /// Individual failures are logged and do not stop the rest.
    async fn broadcast_private(&self, inbound: &Inbound, text: &str) -> AppResult<()> {
        let recipients = self.roster.lock().await.identities();

        let from = inbound.sender.as_deref().unwrap_or("anonymous");
        let message = format!("{from}: {text}");

        let mut delivered = 0usize;
        for identity in &recipients {
            match self.messenger.send_text(identity, &message).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(identity = %identity, error = %e, "Private broadcast failed"),
            }
        }

        tracing::info!(from, delivered, total = recipients.len(), "Private broadcast done");
        self.reply(inbound, &format!("Sent to {delivered}/{} players", recipients.len()))
            .await
    }

    async fn adjust_timers(&self, inbound: &Inbound, adjustment: &TimerAdjustment) -> AppResult<()> {
        let Some(player) = self.acting_player(inbound.sender.as_deref()).await else {
            return Ok(());
        };

        let outcome = {
            let mut roster = self.roster.lock().await;
            match roster.adjust_timers(&player, adjustment, Utc::now()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::debug!(error = %e, "Timer adjustment dropped");
                    return Ok(());
                }
            }
        };

        let text = match outcome {
            AdjustOutcome::Reset { removed } => format!("{player}: {removed} timers cleared"),
            AdjustOutcome::Adjusted { pending } => {
                self.scheduler.schedule_all(pending);
                format!("{player}: timers updated")
            }
        };
        self.reply(inbound, &text).await
    }
}
