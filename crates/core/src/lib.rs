//! Slotkeeper domain model.
//!
//! Pure, I/O-free building blocks for the slot coordination bot:
//!
//! - [`registry`]: player name to messaging identity.
//! - [`positions`]: positional patterns with `-` placeholders.
//! - [`occupancy`]: the eight building slot lists and the duplicate throttle.
//! - [`adjust`]: per-entry timer adjustment for the timed building.
//! - [`format`]: plain-text rendering of occupancy.
//! - [`commands`]: the chat command grammar.
//! - [`roster`]: the single facade owning all of the above.

pub mod adjust;
pub mod commands;
pub mod error;
pub mod format;
pub mod occupancy;
pub mod positions;
pub mod registry;
pub mod roster;
pub mod types;

pub use commands::{Command, ParseError};
pub use error::CoreError;
pub use roster::Roster;
pub use types::{Building, PendingRestore, Timestamp};
