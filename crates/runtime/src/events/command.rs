//! Outbound command primitives and the per-bot buffer that collects them.
use serde::{Deserialize, Serialize};

use dbot_core::Direction;

/// Synthetic input sent to the game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundCommand {
    SignIn { email: String, password: String },
    KeyDown(Direction),
    KeyUp(Direction),
    /// Screen click in client pixels.
    Click { x: i32, y: i32 },
    Chat { channel: String, message: String },
    Logout,
}

/// Commands emitted during one tick, flushed to the transport afterwards.
///
/// Steps never touch the transport directly, so no step can block on I/O.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<OutboundCommand>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: OutboundCommand) {
        tracing::trace!("queued {command:?}");
        self.pending.push(command);
    }

    pub fn key_down(&mut self, direction: Direction) {
        self.push(OutboundCommand::KeyDown(direction));
    }

    pub fn key_up(&mut self, direction: Direction) {
        self.push(OutboundCommand::KeyUp(direction));
    }

    pub fn click(&mut self, (x, y): (i32, i32)) {
        self.push(OutboundCommand::Click { x, y });
    }

    pub fn say(&mut self, channel: &str, message: impl Into<String>) {
        self.push(OutboundCommand::Chat {
            channel: channel.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[OutboundCommand] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<OutboundCommand> {
        std::mem::take(&mut self.pending)
    }
}
