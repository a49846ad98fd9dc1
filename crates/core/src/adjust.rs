//! Timer adjustment for a player's existing timed-building entries.
//!
//! Tokens apply positionally to the player's entries in store order:
//!
//! - `-` leaves the entry untouched
//! - `res` expires it now (no immediate notification is produced)
//! - `H:MM` sets it to expire `H` hours and `MM` minutes from now
//!
//! Surplus tokens are ignored. `reset` on its own deletes the entries instead.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

use crate::error::CoreError;
use crate::occupancy::Occupancy;
use crate::types::{PendingRestore, Timestamp};

static HOURS_MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):([0-5]\d)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustToken {
    Keep,
    Expire,
    Set(Duration),
}

impl AdjustToken {
    pub fn parse(token: &str) -> Result<Self, CoreError> {
        match token {
            "-" => Ok(Self::Keep),
            "res" => Ok(Self::Expire),
            other => parse_hours_minutes(other).map(Self::Set),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAdjustment {
    /// Delete all of the player's timed entries.
    Reset,
    Tokens(Vec<AdjustToken>),
}

impl TimerAdjustment {
    /// Parse the argument list of an adjustment command.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CoreError> {
        match args {
            [] => Err(CoreError::Validation("no timer tokens given".into())),
            [only] if only.as_ref() == "reset" => Ok(Self::Reset),
            tokens => tokens
                .iter()
                .map(|t| AdjustToken::parse(t.as_ref()))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Tokens),
        }
    }
}

/// Apply `tokens` to `owner`'s timed entries.
///
/// Returns one [`PendingRestore`] per `H:MM` token that hit an entry.
pub fn apply_tokens(
    occupancy: &mut Occupancy,
    owner: &str,
    tokens: &[AdjustToken],
    now: Timestamp,
) -> Vec<PendingRestore> {
    let mut pending = Vec::new();

    for (entry, token) in occupancy.timed_entries_mut(owner).zip(tokens) {
        match token {
            AdjustToken::Keep => {}
            AdjustToken::Expire => entry.expires_at = Some(now),
            AdjustToken::Set(after) => {
                let Some(expires_at) = now.checked_add_signed(*after) else {
                    tracing::warn!(owner, ?after, "Timer adjustment beyond representable time, skipped");
                    continue;
                };
                entry.expires_at = Some(expires_at);
                pending.push(PendingRestore {
                    owner: owner.to_string(),
                    expires_at,
                });
            }
        }
    }

    pending
}

fn parse_hours_minutes(token: &str) -> Result<Duration, CoreError> {
    let caps = HOURS_MINUTES_RE.captures(token).ok_or_else(|| {
        CoreError::Validation(format!("expected H:MM, '-' or 'res', got '{token}'"))
    })?;

    let out_of_range = || CoreError::Validation(format!("timer '{token}' is out of range"));

    let hours: i64 = caps[1].parse().map_err(|_| out_of_range())?;
    let minutes: i64 = caps[2].parse().map_err(|_| out_of_range())?;
    Duration::try_hours(hours)
        .and_then(|h| h.checked_add(&Duration::minutes(minutes)))
        .ok_or_else(out_of_range)
}
