//! Inbound server events and outbound command primitives.
//!
//! Both sides of the wire are closed enums: the transport decodes into
//! [`ServerEvent`] and encodes from [`OutboundCommand`].

mod command;
mod server;

pub use command::{OutboundCommand, Outbox};
pub use server::{ChatMessage, PlayerData, PlayerField, ServerEvent, UpdateValue};
