//! Point-to-point text messaging over a broker-signaled data channel.
//!
//! One peer registers a fixed identity with a signaling broker and waits for
//! a connection (the host role); the other registers an auto-assigned
//! identity and dials the host. A [`Session`] owns exactly one local
//! identity and at most one connection, relaying lifecycle and data events
//! into a typed event stream and running every inbound payload through a
//! fixed command table.
//!
//! The signaling protocol and transport mechanics are behind the
//! [`Broker`]/[`Connection`] seams; this crate defines only the session
//! contract on top of them.

pub mod broker;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
mod relay;
pub mod session;
pub mod types;

pub use broker::{Broker, Connection, ConnectionEvent, DialOptions};
pub use config::SessionConfig;
pub use dispatch::{dispatch, ControlSignal, DispatchOutcome};
pub use error::{BrokerError, PeerlinkError, Result, SessionError};
pub use events::{EventReceiver, EventSender, SessionEvent, SessionStatus};
pub use session::Session;
pub use types::{ConnectionState, Direction, LogEntry, PeerId};
