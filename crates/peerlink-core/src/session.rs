//! Session: the connection manager
//!
//! A [`Session`] owns one local identity and at most one peer connection.
//! Construct a fresh session per host/connect action and discard it after
//! disconnect; a session that reached a terminal state is never restarted.

use std::future::Future;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::broker::Broker;
use crate::config::SessionConfig;
use crate::error::{PeerlinkError, Result};
use crate::events::EventReceiver;
use crate::relay::{self, RelayChannels, RelayCommand};
use crate::types::{ConnectionState, PeerId};

/// Handle to a running session.
///
/// All connection mutation happens inside the relay task; the handle only
/// queries state and queues commands, so it can be shared freely with UI
/// code without locking.
pub struct Session {
    commands: mpsc::Sender<RelayCommand>,
    state: watch::Receiver<ConnectionState>,
    identity: watch::Receiver<Option<PeerId>>,
    relay: JoinHandle<()>,
}

impl Session {
    /// Register `host_id` with the broker and wait for one inbound
    /// connection.
    ///
    /// Returns the session handle and its typed event stream. Registration
    /// failures (identity taken, broker unreachable) are reported as an
    /// [`SessionStatus::Errored`](crate::SessionStatus::Errored) status on
    /// the stream, not as a return value; there is no automatic retry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_as_host<B>(broker: B, host_id: PeerId, config: SessionConfig) -> (Self, EventReceiver)
    where
        B: Broker + 'static,
    {
        Self::spawn(&config, move |ch| {
            relay::run_host(Box::new(broker), host_id, ch)
        })
    }

    /// Register an auto-assigned identity, then dial `host_id` once the
    /// broker confirms the registration.
    ///
    /// Failure reporting matches [`Session::start_as_host`]: dial failures
    /// (peer unavailable) surface as an `Errored` status on the stream.
    pub fn connect_to_host<B>(broker: B, host_id: PeerId, config: SessionConfig) -> (Self, EventReceiver)
    where
        B: Broker + 'static,
    {
        let options = config.dial_options();
        Self::spawn(&config, move |ch| {
            relay::run_client(Box::new(broker), host_id, options, ch)
        })
    }

    fn spawn<F, Fut>(config: &SessionConfig, run: F) -> (Self, EventReceiver)
    where
        F: FnOnce(RelayChannels) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);
        let (state_tx, state_rx) = watch::channel(ConnectionState::None);
        let (identity_tx, identity_rx) = watch::channel(None);

        let channels = RelayChannels {
            commands: command_rx,
            events: event_tx,
            state: state_tx,
            identity: identity_tx,
        };
        let relay = tokio::spawn(run(channels));

        (
            Self {
                commands: command_tx,
                state: state_rx,
                identity: identity_rx,
                relay,
            },
            event_rx,
        )
    }

    /// Send a text message over the open connection.
    ///
    /// Fire-and-forget: returns once the message is queued for the relay,
    /// with no acknowledgement of remote receipt. Fails with
    /// [`SessionError::NotConnected`](crate::SessionError::NotConnected)
    /// when no open connection exists. A successful send appends a sent log
    /// entry to the event stream.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(PeerlinkError::not_connected());
        }
        self.commands
            .send(RelayCommand::SendText(text.to_string()))
            .await
            .map_err(|_| PeerlinkError::not_connected())
    }

    /// Whether a connection exists and its channel is open. Synchronous and
    /// non-blocking.
    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_open()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Local identity, once the broker has confirmed it. `None` while
    /// registration is still in flight or after it failed.
    pub fn local_id(&self) -> Option<PeerId> {
        self.identity.borrow().clone()
    }

    /// Close the active connection (if any), release the broker
    /// registration, and wait for the relay to finish.
    ///
    /// Idempotent: calling it again after the session ended is a no-op and
    /// produces no further events.
    pub async fn disconnect(&mut self) {
        if self.commands.send(RelayCommand::Shutdown).await.is_err() {
            // Relay already exited; nothing left to tear down.
            return;
        }
        let _ = (&mut self.relay).await;
    }
}
