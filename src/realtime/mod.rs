//! Real-time update channel.
//!
//! Push updates arrive over a Socket.IO-style websocket. The module is split
//! by responsibility:
//!
//! - `protocol`: the framed sub-protocol (handshake, event frames, URL
//!   derivation).
//! - `topic`: canonical topic keys and their wire payloads.
//! - `registry`: the topic → callback-set map driving dispatch and wire
//!   (un)subscription.
//! - `dispatch`: fans one decoded event out to its registered callbacks.
//! - `connection`: the connection manager owning the socket lifecycle, and
//!   the public subscribe/unsubscribe API.

pub mod connection;
pub mod dispatch;
pub mod protocol;
pub mod registry;
pub mod topic;

pub use connection::{ConnectionState, RealtimeClient};
pub use registry::{Callback, SubscriptionHandle};
pub use topic::{Topic, TopicKind};

#[cfg(test)]
mod tests;
