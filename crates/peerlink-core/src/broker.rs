//! Broker and connection seams
//!
//! This module provides the interface a peerlink session expects from the
//! underlying peer-to-peer library: identity registration with a signaling
//! broker, dialing and accepting connections, and the per-connection
//! lifecycle/data events. Implementations own NAT traversal, signaling and
//! delivery; the session layer reimplements none of it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PeerId;

// ----------------------------------------------------------------------------
// Dial Options
// ----------------------------------------------------------------------------

/// Options applied when dialing a remote identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DialOptions {
    /// Ask the transport for its reliable delivery mode.
    pub reliable: bool,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self { reliable: true }
    }
}

// ----------------------------------------------------------------------------
// Connection Events
// ----------------------------------------------------------------------------

/// Lifecycle and data events reported by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The channel is open; messages can flow.
    Opened,
    /// A text payload arrived from the remote side.
    Data(String),
    /// The channel was closed by either side.
    Closed,
    /// A transport failure ended the channel.
    Failed(String),
}

// ----------------------------------------------------------------------------
// Connection Trait
// ----------------------------------------------------------------------------

/// One logical bidirectional channel to a remote identity.
#[async_trait]
pub trait Connection: Send {
    /// Identity of the remote end.
    fn remote(&self) -> &PeerId;

    /// Hand a text payload to the transport. Fire-and-forget: returning `Ok`
    /// means the transport accepted the payload, not that the remote side
    /// received it.
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Await the next lifecycle or data event. Returns `None` once the
    /// channel is finished and drained. Must be cancellation-safe.
    async fn recv(&mut self) -> Option<ConnectionEvent>;

    /// Close the channel. Idempotent.
    async fn close(&mut self);
}

impl std::fmt::Debug for dyn Connection + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("remote", self.remote())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Broker Trait
// ----------------------------------------------------------------------------

/// A registration with the signaling broker: one outbound identity plus the
/// ability to accept or dial connections under it.
#[async_trait]
pub trait Broker: Send {
    /// Register an identity with the broker. `Some` pins the token (host
    /// role); `None` asks the broker to assign one (client role). Dialing or
    /// accepting before registration is confirmed is invalid.
    async fn register(&mut self, requested: Option<PeerId>) -> Result<PeerId>;

    /// Await the next inbound connection. Must be cancellation-safe: the
    /// session polls this concurrently with the active connection.
    async fn accept(&mut self) -> Result<Box<dyn Connection>>;

    /// Open a connection to a remote identity.
    async fn dial(&mut self, remote: &PeerId, options: DialOptions) -> Result<Box<dyn Connection>>;

    /// Release the registration and all broker-side resources. Idempotent.
    async fn close(&mut self);
}
