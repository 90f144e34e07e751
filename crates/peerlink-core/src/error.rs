//! Error types for peerlink
//!
//! Broker-reported failures and session-level misuse are kept in separate
//! enums, unified by [`PeerlinkError`]. Failures that happen inside the
//! relay task are never returned to a caller; they surface as an `Errored`
//! status on the session event stream.

use thiserror::Error;

use crate::types::PeerId;

// ----------------------------------------------------------------------------
// Specific Error Types
// ----------------------------------------------------------------------------

/// Failures reported by the signaling broker or the underlying transport.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("identity \"{id}\" is already taken")]
    IdentityTaken { id: PeerId },

    #[error("invalid identity: {reason}")]
    InvalidIdentity { reason: String },

    #[error("broker unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("peer \"{id}\" is unavailable")]
    PeerUnavailable { id: PeerId },

    #[error("local identity is not registered")]
    NotRegistered,
}

/// Failures in session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected")]
    NotConnected,

    #[error("connection already closed")]
    AlreadyClosed,
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Top-level error type for peerlink operations.
#[derive(Debug, Error)]
pub enum PeerlinkError {
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl PeerlinkError {
    /// Create an identity-taken error for a duplicate registration.
    pub fn identity_taken(id: PeerId) -> Self {
        BrokerError::IdentityTaken { id }.into()
    }

    /// Create an invalid-identity error with a reason.
    pub fn invalid_identity<R: Into<String>>(reason: R) -> Self {
        BrokerError::InvalidIdentity {
            reason: reason.into(),
        }
        .into()
    }

    /// Create a broker-unreachable error with a reason.
    pub fn unreachable<R: Into<String>>(reason: R) -> Self {
        BrokerError::Unreachable {
            reason: reason.into(),
        }
        .into()
    }

    /// Create a peer-unavailable error for a failed dial.
    pub fn peer_unavailable(id: PeerId) -> Self {
        BrokerError::PeerUnavailable { id }.into()
    }

    /// Create a not-registered error for operations before `register`.
    pub fn not_registered() -> Self {
        BrokerError::NotRegistered.into()
    }

    /// Create a not-connected error for sends without an open channel.
    pub fn not_connected() -> Self {
        SessionError::NotConnected.into()
    }

    /// Create an already-closed error for use after teardown.
    pub fn already_closed() -> Self {
        SessionError::AlreadyClosed.into()
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, PeerlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_human_readable_strings() {
        let err = PeerlinkError::identity_taken(PeerId::new("h1"));
        assert_eq!(err.to_string(), "broker error: identity \"h1\" is already taken");

        let err = PeerlinkError::peer_unavailable(PeerId::new("nobody"));
        assert_eq!(err.to_string(), "broker error: peer \"nobody\" is unavailable");

        let err = PeerlinkError::not_connected();
        assert_eq!(err.to_string(), "session error: not connected");
    }
}
