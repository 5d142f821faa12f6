//! Seam between a bot and whatever carries its traffic.
//!
//! The wire protocol lives outside this crate. A [`Transport`] only has to
//! hand over already-decoded events without blocking and accept outbound
//! commands. [`ChannelTransport`] is the in-process implementation used by
//! the simulator and by tests.
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::api::{Result, RuntimeError};
use crate::events::{OutboundCommand, ServerEvent};

/// Default buffer size for both directions of a [`ChannelTransport`].
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[async_trait]
pub trait Transport: Send {
    /// Pops one buffered event, or `None` when nothing is pending.
    ///
    /// Must never wait for the network.
    fn try_next_event(&mut self) -> Result<Option<ServerEvent>>;

    /// Delivers one command to the server.
    async fn send(&mut self, command: OutboundCommand) -> Result<()>;
}

/// Transport backed by a pair of tokio channels.
pub struct ChannelTransport {
    events: mpsc::Receiver<ServerEvent>,
    commands: mpsc::Sender<OutboundCommand>,
}

/// Server-side ends of a [`ChannelTransport`].
pub struct TransportPeer {
    pub events: mpsc::Sender<ServerEvent>,
    pub commands: mpsc::Receiver<OutboundCommand>,
}

impl ChannelTransport {
    pub fn pair() -> (Self, TransportPeer) {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, TransportPeer) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        (
            Self {
                events: event_rx,
                commands: command_tx,
            },
            TransportPeer {
                events: event_tx,
                commands: command_rx,
            },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    fn try_next_event(&mut self) -> Result<Option<ServerEvent>> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RuntimeError::TransportClosed),
        }
    }

    async fn send(&mut self, command: OutboundCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::TransportClosed)
    }
}
