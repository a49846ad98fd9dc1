//! Integration tests for the command dispatcher.
//!
//! Commands go through `CommandDispatcher::handle` exactly as the poll loop
//! would send them, with a recording messenger standing in for Telegram.

mod common;

use std::time::Duration;

use common::{Harness, GROUP};
use slotkeeper_api::engine::Inbound;
use slotkeeper_core::commands::{HELP_TEXT, USAGE_REGISTER, USAGE_TIMERS};
use slotkeeper_core::Building;

const HOUR: Duration = Duration::from_secs(3600);

fn b(i: u8) -> Building {
    Building::new(i).unwrap()
}

/// A fresh `H:MM` render of a two-hour cooldown, read a moment later.
fn is_full_cooldown(token: &str) -> bool {
    token == "2:00" || token == "1:59"
}

// ---------------------------------------------------------------------------
// Test: register + positional pattern + list for one building
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn pattern_assigns_and_list_shows_timers() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    assert_eq!(h.last_reply().as_deref(), Some("Registered Alice as @alice"));

    h.say("@alice", "/003").await;
    {
        let roster = h.state.roster.lock().await;
        assert_eq!(roster.occupancy().count_for(b(0), "Alice"), 2);
        assert_eq!(roster.occupancy().count_for(b(3), "Alice"), 1);
    }
    assert_eq!(h.state.scheduler.in_flight(), 2);

    h.say("@alice", "/l0").await;
    let reply = h.last_reply().unwrap();
    let mut lines = reply.lines();
    assert_eq!(lines.next(), Some("Building 0:"));

    let line = lines.next().unwrap();
    assert!(line.starts_with("2x Alice (alice) "), "got: {line}");
    let times: Vec<&str> = line.split(' ').skip(3).collect();
    assert_eq!(times.len(), 2);
    assert!(times.iter().all(|t| is_full_cooldown(t)), "got: {line}");
}

// ---------------------------------------------------------------------------
// Test: restore notification is delivered to the owner after the cooldown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn restore_notification_fires_after_cooldown() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/0-1").await;

    tokio::time::sleep(HOUR).await;
    assert!(h.messenger.sent_to("@alice").is_empty());

    assert!(h.state.scheduler.shutdown(2 * HOUR).await);
    assert_eq!(h.messenger.sent_to("@alice"), vec!["@alice car restored"]);
}

// ---------------------------------------------------------------------------
// Test: unregistered senders are ignored silently
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pattern_from_unregistered_sender_is_ignored() {
    let h = Harness::new();
    h.say("@stranger", "/123").await;

    assert!(h.messenger.sent().is_empty());
    assert_eq!(h.state.roster.lock().await.occupancy().total(), 0);
}

#[tokio::test]
async fn sender_without_identity_is_ignored() {
    let h = Harness::new();
    let inbound = Inbound {
        chat_id: GROUP.to_string(),
        sender: None,
        message_id: None,
    };
    h.dispatcher.handle(&inbound, "/h reset").await.unwrap();

    assert!(h.messenger.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Test: acting on behalf of another identity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pattern_on_behalf_of_other_player() {
    let h = Harness::new();
    h.say("@alice", "/register Bob @bob").await;
    h.say("@alice", "/567 @bob").await;

    let roster = h.state.roster.lock().await;
    assert_eq!(roster.occupancy().count_for(b(5), "Bob"), 1);
    assert_eq!(roster.last_positions("Bob"), &[b(5), b(6), b(7)]);
}

// ---------------------------------------------------------------------------
// Test: placeholders reuse the previous pattern
// ---------------------------------------------------------------------------

#[tokio::test]
async fn placeholders_follow_previous_pattern() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/250").await;
    h.say("@alice", "/--3").await;

    let roster = h.state.roster.lock().await;
    assert_eq!(roster.last_positions("Alice"), &[b(2), b(5), b(3)]);
    assert_eq!(roster.occupancy().count_for(b(2), "Alice"), 2);
}

// ---------------------------------------------------------------------------
// Test: malformed commands get a usage reply, unknown ones are ignored
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_register_replies_with_usage() {
    let h = Harness::new();
    h.say("@alice", "/register Alice").await;

    assert_eq!(h.last_reply(), Some(format!("Usage: {USAGE_REGISTER}")));
    assert!(h.state.roster.lock().await.players().is_empty());
}

#[tokio::test]
async fn unknown_commands_and_chatter_are_ignored() {
    let h = Harness::new();
    h.say("@alice", "/dance").await;
    h.say("@alice", "good morning").await;

    assert!(h.messenger.sent().is_empty());
}

#[tokio::test]
async fn help_lists_commands_and_deletes_request() {
    let h = Harness::new();
    h.say("@alice", "/list").await;
    h.say("@alice", "/help").await;

    assert_eq!(h.last_reply().as_deref(), Some(HELP_TEXT));
    assert_eq!(h.messenger.deleted(), vec![(GROUP.to_string(), 2)]);
}

#[tokio::test]
async fn help_still_replies_when_delete_fails() {
    let h = Harness::new();
    h.messenger.fail_deletes();
    h.say("@alice", "/start").await;

    assert_eq!(h.last_reply().as_deref(), Some(HELP_TEXT));
    assert!(h.messenger.deleted().is_empty());
}

// ---------------------------------------------------------------------------
// Test: direct building assignment
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn assign_skips_unknown_names_and_throttles() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/register Bob @bob").await;

    h.say("@alice", "/b0 Alice, Ghost, Bob").await;
    assert_eq!(
        h.last_reply().as_deref(),
        Some("Building 0: added Alice, Bob")
    );
    assert_eq!(h.state.scheduler.in_flight(), 2);

    h.say("@alice", "/b4 Alice, Alice, Alice").await;
    assert_eq!(
        h.state
            .roster
            .lock()
            .await
            .occupancy()
            .count_for(b(4), "Alice"),
        2
    );
}

// ---------------------------------------------------------------------------
// Test: timer adjustment and reset
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn adjust_then_reset_timers() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/003").await;

    h.say("@alice", "/h 1:30 res").await;
    assert_eq!(h.last_reply().as_deref(), Some("Alice: timers updated"));
    // Two from the pattern plus one for the re-timed entry.
    assert_eq!(h.state.scheduler.in_flight(), 3);

    h.say("@alice", "/l0").await;
    let reply = h.last_reply().unwrap();
    let line = reply.lines().nth(1).unwrap();
    assert!(
        line == "2x Alice (alice) 1:30 0:00" || line == "2x Alice (alice) 1:29 0:00",
        "got: {line}"
    );

    h.say("@alice", "/h reset").await;
    assert_eq!(h.last_reply().as_deref(), Some("Alice: 2 timers cleared"));
    let roster = h.state.roster.lock().await;
    assert!(roster.occupancy().entries(b(0)).is_empty());
    assert_eq!(roster.occupancy().count_for(b(3), "Alice"), 1);
}

#[tokio::test(start_paused = true)]
async fn timer_reset_keeps_scheduled_notification() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/0-1").await;

    h.say("@alice", "/h reset").await;
    assert_eq!(h.last_reply().as_deref(), Some("Alice: 1 timers cleared"));
    assert!(h
        .state
        .roster
        .lock()
        .await
        .occupancy()
        .entries(Building::TIMED)
        .is_empty());

    assert!(h.state.scheduler.shutdown(3 * HOUR).await);
    assert_eq!(h.messenger.sent_to("@alice"), vec!["@alice car restored"]);
}

#[tokio::test(start_paused = true)]
async fn expire_token_notifies_only_at_original_expiry() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/0-1").await;

    h.say("@alice", "/h res").await;
    assert_eq!(h.last_reply().as_deref(), Some("Alice: timers updated"));
    assert_eq!(h.state.scheduler.in_flight(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(h.messenger.sent_to("@alice").is_empty());

    tokio::time::sleep(HOUR).await;
    assert!(h.messenger.sent_to("@alice").is_empty());

    assert!(h.state.scheduler.shutdown(HOUR).await);
    assert_eq!(h.messenger.sent_to("@alice"), vec!["@alice car restored"]);
}

#[tokio::test]
async fn malformed_timer_tokens_reply_with_usage() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/h reset 1:00").await;

    assert_eq!(h.last_reply(), Some(format!("Usage: {USAGE_TIMERS}")));
}

// ---------------------------------------------------------------------------
// Test: remove cascades, reset keeps players
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn remove_cascades_and_suppresses_notifications() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/012").await;

    h.say("@admin", "/remove Alice").await;
    assert_eq!(h.last_reply().as_deref(), Some("Removed Alice"));
    {
        let roster = h.state.roster.lock().await;
        assert_eq!(roster.resolve_by_identity("@alice"), None);
        assert_eq!(roster.occupancy().total(), 0);
    }

    assert!(h.state.scheduler.shutdown(3 * HOUR).await);
    assert!(h.messenger.sent_to("@alice").is_empty());
}

#[tokio::test]
async fn remove_unknown_player_is_harmless() {
    let h = Harness::new();
    h.say("@admin", "/remove Ghost").await;
    assert_eq!(h.last_reply().as_deref(), Some("Ghost is not registered"));
}

#[tokio::test]
async fn reset_clears_buildings_but_keeps_players() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/135").await;

    h.say("@alice", "/reset").await;
    assert_eq!(h.last_reply().as_deref(), Some("All buildings reset"));

    let roster = h.state.roster.lock().await;
    assert_eq!(roster.occupancy().total(), 0);
    assert_eq!(roster.resolve_by_identity("@alice"), Some("Alice"));
}

// ---------------------------------------------------------------------------
// Test: list, call, xall
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_renders_all_buildings() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/777").await;

    h.say("@alice", "/list").await;
    let reply = h.last_reply().unwrap();
    assert_eq!(reply.matches("Building ").count(), 8);
    assert!(reply.contains("Building 7:\n2x Alice (alice)"));
}

#[tokio::test]
async fn call_mentions_everyone() {
    let h = Harness::new();
    h.say("@alice", "/call").await;
    assert_eq!(h.last_reply().as_deref(), Some("No players registered"));

    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/register Bob @bob").await;
    h.say("@alice", "/call raid at 9").await;
    assert_eq!(h.last_reply().as_deref(), Some("@alice @bob\nraid at 9"));
}

#[tokio::test]
async fn xall_sends_privately_and_survives_failures() {
    let h = Harness::new();
    h.say("@alice", "/register Alice @alice").await;
    h.say("@alice", "/register Bob @bob").await;
    h.say("@alice", "/register Carol @carol").await;
    h.messenger.fail_for("@bob");
    h.messenger.clear();

    h.say("@alice", "/xall meet at base").await;

    assert_eq!(h.messenger.sent_to("@alice"), vec!["@alice: meet at base"]);
    assert_eq!(h.messenger.sent_to("@carol"), vec!["@alice: meet at base"]);
    assert_eq!(h.last_reply().as_deref(), Some("Sent to 2/3 players"));
}
