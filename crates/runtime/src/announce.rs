//! Chat lines bots use to share terrain discoveries.
//!
//! ```text
//! <prompt> bonked at <map> <x> <y>
//! <prompt> transported at <map> <x> <y> to <map> <x> <y>
//! ```
//!
//! The prompt is the shared command prompt, so peers receive these as
//! ordinary [`ChatCommand`](crate::ChatCommand)s.
use std::fmt;

use dbot_core::{Location, Point};

/// A discovery another bot announced (or this bot is about to announce).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerReport {
    /// The cell at `at` is blocked.
    Bonked { at: Location },
    /// Stepping on `from` leads to `to`.
    Transported { from: Location, to: Location },
}

impl PeerReport {
    /// Parses the words following the prompt, starting at the verb.
    pub fn from_words(words: &[&str]) -> Option<Self> {
        match words {
            ["bonked", "at", map, x, y] => Some(PeerReport::Bonked {
                at: location(map, x, y)?,
            }),
            ["transported", "at", map, x, y, "to", to_map, to_x, to_y] => {
                Some(PeerReport::Transported {
                    from: location(map, x, y)?,
                    to: location(to_map, to_x, to_y)?,
                })
            }
            _ => None,
        }
    }

    /// The full chat line, addressed to every bot listening on `prompt`.
    pub fn announcement(&self, prompt: &str) -> String {
        format!("{prompt} {self}")
    }
}

fn location(map: &str, x: &str, y: &str) -> Option<Location> {
    Some(Location::new(map, Point::new(x.parse().ok()?, y.parse().ok()?)))
}

impl fmt::Display for PeerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerReport::Bonked { at } => {
                write!(f, "bonked at {} {} {}", at.map, at.point.x, at.point.y)
            }
            PeerReport::Transported { from, to } => write!(
                f,
                "transported at {} {} {} to {} {} {}",
                from.map, from.point.x, from.point.y, to.map, to.point.x, to.point.y
            ),
        }
    }
}
