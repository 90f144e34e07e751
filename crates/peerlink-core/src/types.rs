//! Core types for peerlink sessions
//!
//! Newtype patterns for broker-namespaced identities plus the connection
//! lifecycle and the observational log entry model shared by both peers.

use core::fmt;
use core::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Peer Identifier
// ----------------------------------------------------------------------------

/// Broker-namespaced identity token a peer is addressed by.
///
/// Host identities are chosen by the caller; client identities are minted at
/// registration time. Uniqueness holds within one broker namespace at any
/// instant, and the token is released when the registration closes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Create a PeerId from an existing token.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Mint a random identity for the client role.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PeerId {
    type Err = crate::PeerlinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::PeerlinkError::invalid_identity(
                "peer id must not be empty",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ----------------------------------------------------------------------------
// Connection State
// ----------------------------------------------------------------------------

/// Lifecycle of the single logical channel owned by a session.
///
/// `Closed` and `Errored` are terminal: a session is never reused after
/// reaching either, callers construct a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection has been made yet.
    None,
    /// A connection exists but the channel has not opened.
    Pending,
    /// The channel is open and messages can flow.
    Open,
    /// The channel was closed by either side.
    Closed,
    /// A broker or transport failure ended the session.
    Errored,
}

impl ConnectionState {
    /// Whether messages can be sent right now.
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Whether the session has finished for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }
}

// ----------------------------------------------------------------------------
// Log Entries
// ----------------------------------------------------------------------------

/// Direction tag of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Payload handed to the transport by the local side.
    Sent,
    /// Payload delivered by the remote side.
    Received,
    /// Session-internal note (registration, refusals, unrecognized input).
    System,
}

/// Append-only observational record of session traffic.
///
/// Never read back programmatically; tests and UIs consume it off the event
/// stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub direction: Direction,
    pub text: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn now(direction: Direction, text: impl Into<String>) -> Self {
        Self {
            direction,
            text: text.into(),
            timestamp: unix_millis(),
        }
    }

    /// Entry for a payload handed to the transport.
    pub fn sent(text: impl Into<String>) -> Self {
        Self::now(Direction::Sent, text)
    }

    /// Entry for a payload delivered by the remote side.
    pub fn received(text: impl Into<String>) -> Self {
        Self::now(Direction::Received, text)
    }

    /// Entry for a session-internal note.
    pub fn system(text: impl Into<String>) -> Self {
        Self::now(Direction::System, text)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.direction {
            Direction::Sent => "TX",
            Direction::Received => "RX",
            Direction::System => "--",
        };
        write!(f, "[{}] {}: {}", self.timestamp, tag, self.text)
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_id_parses_and_trims() {
        let id: PeerId = " h1 ".parse().unwrap();
        assert_eq!(id.as_str(), "h1");
        assert_eq!(id.to_string(), "h1");
    }

    #[test]
    fn empty_peer_id_is_rejected() {
        assert!("   ".parse::<PeerId>().is_err());
        assert!("".parse::<PeerId>().is_err());
    }

    #[test]
    fn random_peer_ids_differ() {
        assert_ne!(PeerId::random(), PeerId::random());
    }

    #[test]
    fn state_predicates() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Pending.is_open());
        assert!(ConnectionState::Closed.is_terminal());
        assert!(ConnectionState::Errored.is_terminal());
        assert!(!ConnectionState::None.is_terminal());
    }

    #[test]
    fn log_entry_renders_direction_tag() {
        let entry = LogEntry {
            direction: Direction::Received,
            text: "PING".to_string(),
            timestamp: 42,
        };
        assert_eq!(entry.to_string(), "[42] RX: PING");

        let entry = LogEntry {
            direction: Direction::System,
            text: "registered".to_string(),
            timestamp: 7,
        };
        assert_eq!(entry.to_string(), "[7] --: registered");
    }

    #[test]
    fn log_entry_constructors_stamp_time() {
        let entry = LogEntry::sent("hello");
        assert_eq!(entry.direction, Direction::Sent);
        assert!(entry.timestamp > 0);
    }
}
