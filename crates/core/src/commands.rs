//! Text command grammar.
//!
//! Turns one chat message into a [`Command`]. Commands start with `/`, are
//! case-sensitive, and take space- or comma-separated arguments. A trailing
//! `@botname` on the command word (added by group chats) is ignored.

use crate::adjust::TimerAdjustment;
use crate::positions::{self, PositionPattern};
use crate::types::{Building, Identity, PlayerName};

pub const USAGE_REGISTER: &str = "/register InGameName @TelegramName";
pub const USAGE_REMOVE: &str = "/remove InGameName";
pub const USAGE_POSITIONS: &str = "/123 /1-3 /-45";
pub const USAGE_ASSIGN: &str = "/bX InGame1, InGame2";
pub const USAGE_XALL: &str = "/xall text";
pub const USAGE_TIMERS: &str = "/h x:xx x:xx | res | reset";

/// Summary of every command, sent in reply to `/help`.
pub const HELP_TEXT: &str = "/register InGameName @TelegramName\n\
/remove InGameName\n\
/123 /1-3 /-45\n\
/list\n\
/lX\n\
/bX InGame1, InGame2\n\
/reset\n\
/call text\n\
/xall text\n\
/h x:xx x:xx | res | reset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Register {
        name: PlayerName,
        identity: Identity,
    },
    Remove {
        name: PlayerName,
    },
    Reset,
    List,
    ListBuilding(Building),
    AssignBuilding {
        building: Building,
        names: Vec<PlayerName>,
    },
    Positional {
        pattern: PositionPattern,
        /// Act for the player registered under this identity instead of the sender.
        on_behalf_of: Option<Identity>,
    },
    Call {
        text: Option<String>,
    },
    Xall {
        text: String,
    },
    AdjustTimers(TimerAdjustment),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not a command")]
    NotACommand,

    #[error("unknown command: {0}")]
    Unknown(String),

    /// Recognised command with the wrong argument shape.
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        let body = text.strip_prefix('/').ok_or(ParseError::NotACommand)?;

        let (word, rest) = match body.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (body, ""),
        };
        let word = word.split_once('@').map_or(word, |(w, _)| w);
        let args: Vec<&str> = rest
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();

        match word {
            "help" | "start" => Ok(Self::Help),
            "register" => match args.as_slice() {
                [name, identity] => Ok(Self::Register {
                    name: name.to_string(),
                    identity: identity.to_string(),
                }),
                _ => Err(ParseError::Usage(USAGE_REGISTER)),
            },
            "remove" => match args.as_slice() {
                [name] => Ok(Self::Remove {
                    name: name.to_string(),
                }),
                _ => Err(ParseError::Usage(USAGE_REMOVE)),
            },
            "reset" => Ok(Self::Reset),
            "list" => Ok(Self::List),
            "call" => Ok(Self::Call {
                text: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "xall" if rest.is_empty() => Err(ParseError::Usage(USAGE_XALL)),
            "xall" => Ok(Self::Xall {
                text: rest.to_string(),
            }),
            "h" => TimerAdjustment::parse(args.as_slice())
                .map(Self::AdjustTimers)
                .map_err(|_| ParseError::Usage(USAGE_TIMERS)),
            w if positions::is_pattern(w) => match args.as_slice() {
                [] => Ok(Self::Positional {
                    pattern: parse_pattern(w)?,
                    on_behalf_of: None,
                }),
                [identity] => Ok(Self::Positional {
                    pattern: parse_pattern(w)?,
                    on_behalf_of: Some(identity.to_string()),
                }),
                _ => Err(ParseError::Usage(USAGE_POSITIONS)),
            },
            w => match building_suffix(w) {
                Some(('l', building)) => Ok(Self::ListBuilding(building)),
                Some(('b', _)) if args.is_empty() => Err(ParseError::Usage(USAGE_ASSIGN)),
                Some(('b', building)) => Ok(Self::AssignBuilding {
                    building,
                    names: args.iter().map(|s| s.to_string()).collect(),
                }),
                _ => Err(ParseError::Unknown(w.to_string())),
            },
        }
    }
}

fn parse_pattern(word: &str) -> Result<PositionPattern, ParseError> {
    PositionPattern::parse(word).map_err(|_| ParseError::Usage(USAGE_POSITIONS))
}

/// Split words like `l3` / `b7` into their prefix letter and building.
fn building_suffix(word: &str) -> Option<(char, Building)> {
    let mut chars = word.chars();
    let prefix = chars.next()?;
    let digit = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Building::from_digit(digit).map(|b| (prefix, b))
}
