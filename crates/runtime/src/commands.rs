//! Chat commands addressed to the bots.
//!
//! ```text
//! <prompt> <command> [args...]
//! ```
//!
//! The prompt is either the shared [`command_prompt`] (every bot listens) or a
//! bot's own name, optionally `@`-prefixed. Most commands only obey admins and
//! friends; greetings and position queries are open to anyone.
//!
//! [`command_prompt`]: crate::RuntimeConfig::command_prompt
use dbot_core::Point;

use crate::announce::PeerReport;

pub const HELLO_MESSAGES: [&str; 5] = ["hey :)", "hello!", "\\o", "greetings", "howdy!"];

#[derive(Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChatCommand {
    /// `say hi`
    Hello,
    /// `where are you`
    Where,
    Stop,
    /// `goto <x> <y>`; `None` when the coordinates did not parse.
    Goto(Option<Point>),
    /// `party up`
    PartyUp,
    Logout,
    Assemble,
    /// `map`: explore the current map.
    Map,
    /// `bonked at ...` / `transported at ...` from a peer.
    Peer(PeerReport),
}

impl ChatCommand {
    /// Parses `contents` if it is addressed to `me`, either directly or
    /// through `prompt`. Unknown commands are logged and dropped.
    pub fn parse(contents: &str, prompt: &str, me: &str) -> Option<Self> {
        let words: Vec<&str> = contents.split_whitespace().collect();
        let [addressee, command, args @ ..] = words.as_slice() else {
            return None;
        };
        let direct = *addressee == me || addressee.strip_prefix('@') == Some(me);
        if *addressee != prompt && !direct {
            return None;
        }

        let parsed = match (*command, args) {
            ("say", ["hi", ..]) => ChatCommand::Hello,
            ("where", ["are", "you"]) => ChatCommand::Where,
            ("stop", _) => ChatCommand::Stop,
            ("goto", [x, y]) => {
                let x = x.parse::<i32>().ok();
                let y = y.parse::<i32>().ok();
                ChatCommand::Goto(x.zip(y).map(Point::from))
            }
            ("party", ["up", ..]) => ChatCommand::PartyUp,
            ("logout", _) => ChatCommand::Logout,
            ("assemble", _) => ChatCommand::Assemble,
            ("map", _) => ChatCommand::Map,
            ("bonked" | "transported", _) => {
                ChatCommand::Peer(PeerReport::from_words(&words[1..])?)
            }
            _ => {
                tracing::info!("no such command: {contents}");
                return None;
            }
        };
        Some(parsed)
    }

    /// Whether only admins and friends may issue this command.
    pub fn admin_only(&self) -> bool {
        !matches!(self, ChatCommand::Hello | ChatCommand::Where)
    }
}
