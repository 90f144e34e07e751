//! Event relay task
//!
//! One tokio task per session owns the broker registration and the live
//! connection. The session handle talks to it only through channels:
//! commands in over mpsc, typed events out over mpsc, connection state out
//! over watch. The task is single-shot: once the connection finishes, it
//! releases the registration and exits.

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::broker::{Broker, Connection, ConnectionEvent, DialOptions};
use crate::dispatch::{dispatch, DispatchOutcome};
use crate::error::Result;
use crate::events::{EventSender, SessionEvent, SessionStatus};
use crate::types::{ConnectionState, LogEntry, PeerId};

// ----------------------------------------------------------------------------
// Relay Channels
// ----------------------------------------------------------------------------

/// Commands the session handle sends to its relay task.
#[derive(Debug)]
pub(crate) enum RelayCommand {
    SendText(String),
    Shutdown,
}

/// Channel endpoints owned by the relay task.
pub(crate) struct RelayChannels {
    pub commands: mpsc::Receiver<RelayCommand>,
    pub events: EventSender,
    pub state: watch::Sender<ConnectionState>,
    pub identity: watch::Sender<Option<PeerId>>,
}

impl RelayChannels {
    async fn emit(&self, event: SessionEvent) {
        // A dropped receiver means the application went away; the relay
        // keeps running so the connection still tears down cleanly.
        let _ = self.events.send(event).await;
    }

    async fn status(&self, status: SessionStatus) {
        self.emit(SessionEvent::Status(status)).await;
    }

    async fn log(&self, entry: LogEntry) {
        self.emit(SessionEvent::Log(entry)).await;
    }

    fn set_state(&self, state: ConnectionState) {
        let _ = self.state.send(state);
    }

    fn set_identity(&self, id: PeerId) {
        let _ = self.identity.send(Some(id));
    }

    /// Enter the terminal errored state. No retry, no reconnection.
    async fn fail(&self, reason: String) {
        warn!(%reason, "session entered errored state");
        self.set_state(ConnectionState::Errored);
        self.status(SessionStatus::Errored { reason }).await;
    }

    async fn disconnected(&self) {
        self.set_state(ConnectionState::Closed);
        self.status(SessionStatus::Disconnected).await;
    }
}

// ----------------------------------------------------------------------------
// Host Role
// ----------------------------------------------------------------------------

/// Register the fixed host identity, wait for one inbound connection, then
/// pump it until it finishes.
pub(crate) async fn run_host(mut broker: Box<dyn Broker>, host_id: PeerId, mut ch: RelayChannels) {
    ch.status(SessionStatus::Starting).await;

    let id = match broker.register(Some(host_id)).await {
        Ok(id) => id,
        Err(err) => {
            ch.fail(err.to_string()).await;
            broker.close().await;
            return;
        }
    };
    ch.set_identity(id.clone());
    ch.log(LogEntry::system(format!("registered as \"{id}\""))).await;
    ch.status(SessionStatus::Listening { id }).await;

    // Wait indefinitely for the first inbound connection; only an explicit
    // disconnect (or the handle going away) aborts the wait.
    let mut conn = loop {
        tokio::select! {
            accepted = broker.accept() => match accepted {
                Ok(conn) => break conn,
                Err(err) => {
                    ch.fail(err.to_string()).await;
                    broker.close().await;
                    return;
                }
            },
            command = ch.commands.recv() => match command {
                Some(RelayCommand::SendText(_)) => {
                    // The handle rejects sends before the channel opens; a
                    // send racing the open is dropped rather than queued.
                    debug!("dropping send issued before the channel opened");
                }
                Some(RelayCommand::Shutdown) | None => {
                    broker.close().await;
                    ch.disconnected().await;
                    return;
                }
            },
        }
    };

    ch.set_state(ConnectionState::Pending);
    pump(&mut broker, &mut conn, &mut ch, true).await;
    broker.close().await;
}

// ----------------------------------------------------------------------------
// Client Role
// ----------------------------------------------------------------------------

/// Register an auto-assigned identity, dial the host once registration is
/// confirmed, then pump the connection until it finishes.
pub(crate) async fn run_client(
    mut broker: Box<dyn Broker>,
    host_id: PeerId,
    options: DialOptions,
    mut ch: RelayChannels,
) {
    ch.status(SessionStatus::Starting).await;

    // Registration strictly precedes the dial: requesting a connection
    // before the broker confirms the local identity is invalid.
    let id = match broker.register(None).await {
        Ok(id) => id,
        Err(err) => {
            ch.fail(err.to_string()).await;
            broker.close().await;
            return;
        }
    };
    ch.set_identity(id.clone());
    ch.log(LogEntry::system(format!("registered as \"{id}\""))).await;
    ch.status(SessionStatus::Connecting {
        remote: host_id.clone(),
    })
    .await;

    let mut conn = match broker.dial(&host_id, options).await {
        Ok(conn) => conn,
        Err(err) => {
            ch.fail(err.to_string()).await;
            broker.close().await;
            return;
        }
    };

    ch.set_state(ConnectionState::Pending);
    pump(&mut broker, &mut conn, &mut ch, false).await;
    broker.close().await;
}

// ----------------------------------------------------------------------------
// Connection Pump
// ----------------------------------------------------------------------------

/// Forward connection lifecycle and data events into the session event
/// stream until the channel finishes. A listening host additionally refuses
/// inbound connections beyond the active one.
async fn pump(
    broker: &mut Box<dyn Broker>,
    conn: &mut Box<dyn Connection>,
    ch: &mut RelayChannels,
    listening: bool,
) {
    loop {
        tokio::select! {
            event = conn.recv() => match event {
                Some(ConnectionEvent::Opened) => {
                    ch.set_state(ConnectionState::Open);
                    ch.status(SessionStatus::Connected {
                        remote: conn.remote().clone(),
                    })
                    .await;
                }
                Some(ConnectionEvent::Data(payload)) => {
                    if let Err(err) = handle_data(conn, ch, payload).await {
                        ch.fail(err.to_string()).await;
                        return;
                    }
                }
                Some(ConnectionEvent::Closed) | None => {
                    ch.disconnected().await;
                    return;
                }
                Some(ConnectionEvent::Failed(reason)) => {
                    ch.fail(reason).await;
                    return;
                }
            },
            command = ch.commands.recv() => match command {
                Some(RelayCommand::SendText(text)) => {
                    match conn.send(&text).await {
                        Ok(()) => ch.log(LogEntry::sent(text)).await,
                        Err(err) => {
                            ch.fail(err.to_string()).await;
                            return;
                        }
                    }
                }
                Some(RelayCommand::Shutdown) | None => {
                    conn.close().await;
                    ch.disconnected().await;
                    return;
                }
            },
            extra = broker.accept(), if listening => {
                if let Ok(mut second) = extra {
                    warn!(peer = %second.remote(), "refusing inbound connection while one is active");
                    ch.log(LogEntry::system(format!(
                        "refused connection from \"{}\"",
                        second.remote()
                    )))
                    .await;
                    second.close().await;
                }
            },
        }
    }
}

/// Log an inbound payload, deliver it to the application, and apply the
/// dispatcher's outcome.
async fn handle_data(
    conn: &mut Box<dyn Connection>,
    ch: &mut RelayChannels,
    payload: String,
) -> Result<()> {
    ch.log(LogEntry::received(payload.clone())).await;
    ch.emit(SessionEvent::Message(payload.clone())).await;

    match dispatch(&payload) {
        DispatchOutcome::Reply(reply) => {
            debug!(%payload, %reply, "dispatching reply");
            conn.send(reply).await?;
            ch.log(LogEntry::sent(reply)).await;
        }
        DispatchOutcome::Signal(signal) => {
            debug!(%payload, ?signal, "dispatching control signal");
            ch.emit(SessionEvent::Control(signal)).await;
        }
        DispatchOutcome::Unrecognized => {
            ch.log(LogEntry::system(format!("unrecognized command: {payload}")))
                .await;
        }
    }
    Ok(())
}
