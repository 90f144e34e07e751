//! Typed session event schema
//!
//! One typed event stream instead of per-connection callbacks: status
//! updates, append-only log entries, inbound messages and control signals
//! are all variants delivered over a tokio mpsc channel, so the relay is
//! testable without a real transport.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::dispatch::ControlSignal;
use crate::types::{LogEntry, PeerId};

// ----------------------------------------------------------------------------
// Session Status
// ----------------------------------------------------------------------------

/// High-level status of the session, rendered for the status sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The session task is starting up.
    Starting,
    /// Registered as `id` and waiting for one inbound connection.
    Listening { id: PeerId },
    /// Registered and dialing the host.
    Connecting { remote: PeerId },
    /// The channel to `remote` is open.
    Connected { remote: PeerId },
    /// The channel was closed; the session is finished.
    Disconnected,
    /// A broker or transport failure ended the session. Terminal: recovery
    /// means constructing a new session.
    Errored { reason: String },
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Starting => write!(f, "starting"),
            SessionStatus::Listening { id } => {
                write!(f, "listening as \"{id}\", waiting for a peer")
            }
            SessionStatus::Connecting { remote } => write!(f, "connecting to \"{remote}\""),
            SessionStatus::Connected { remote } => write!(f, "connected to \"{remote}\""),
            SessionStatus::Disconnected => write!(f, "disconnected"),
            SessionStatus::Errored { reason } => write!(f, "error: {reason}"),
        }
    }
}

// ----------------------------------------------------------------------------
// Session Events
// ----------------------------------------------------------------------------

/// Events delivered to the application over the session's event channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Status sink update.
    Status(SessionStatus),
    /// Append-only log sink entry.
    Log(LogEntry),
    /// Inbound payload handed to the application, one event per message.
    Message(String),
    /// Recognized control command surfaced to the application.
    Control(ControlSignal),
}

// ----------------------------------------------------------------------------
// Channel Aliases
// ----------------------------------------------------------------------------

pub type EventSender = tokio::sync::mpsc::Sender<SessionEvent>;
pub type EventReceiver = tokio::sync::mpsc::Receiver<SessionEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_renders_for_the_status_sink() {
        let status = SessionStatus::Listening {
            id: PeerId::new("h1"),
        };
        assert_eq!(status.to_string(), "listening as \"h1\", waiting for a peer");

        let status = SessionStatus::Connected {
            remote: PeerId::new("abc"),
        };
        assert_eq!(status.to_string(), "connected to \"abc\"");

        let status = SessionStatus::Errored {
            reason: "broker unreachable: timeout".to_string(),
        };
        assert_eq!(status.to_string(), "error: broker unreachable: timeout");
    }
}
