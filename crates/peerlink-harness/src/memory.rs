//! In-memory broker network
//!
//! A [`MemoryNetwork`] is one broker namespace: a shared registry of
//! registered identities, each with an inbound-connection queue. Endpoints
//! minted from the same network can register, dial and accept against each
//! other; connections are crossed channel pairs that deliver `Opened`,
//! `Data` and `Closed` events in order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use peerlink_core::broker::{Broker, Connection, ConnectionEvent, DialOptions};
use peerlink_core::error::{PeerlinkError, Result};
use peerlink_core::types::PeerId;

/// Capacity of each direction of a memory connection.
const CONNECTION_CAPACITY: usize = 64;

/// Capacity of each identity's inbound-connection queue.
const LISTEN_CAPACITY: usize = 4;

type Registry = Arc<Mutex<HashMap<PeerId, mpsc::Sender<MemoryConnection>>>>;

// ----------------------------------------------------------------------------
// Network
// ----------------------------------------------------------------------------

/// Shared in-process broker namespace.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    registry: Registry,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an unregistered broker endpoint bound to this network.
    pub fn endpoint(&self) -> MemoryBroker {
        MemoryBroker {
            registry: Arc::clone(&self.registry),
            identity: None,
            inbound: None,
        }
    }
}

// ----------------------------------------------------------------------------
// Broker Endpoint
// ----------------------------------------------------------------------------

/// One registration slot in a [`MemoryNetwork`].
pub struct MemoryBroker {
    registry: Registry,
    identity: Option<PeerId>,
    inbound: Option<mpsc::Receiver<MemoryConnection>>,
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn register(&mut self, requested: Option<PeerId>) -> Result<PeerId> {
        let id = requested.unwrap_or_else(PeerId::random);
        let (listen_tx, listen_rx) = mpsc::channel(LISTEN_CAPACITY);
        {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            if registry.contains_key(&id) {
                return Err(PeerlinkError::identity_taken(id));
            }
            registry.insert(id.clone(), listen_tx);
        }
        self.identity = Some(id.clone());
        self.inbound = Some(listen_rx);
        Ok(id)
    }

    async fn accept(&mut self) -> Result<Box<dyn Connection>> {
        let inbound = self
            .inbound
            .as_mut()
            .ok_or_else(PeerlinkError::not_registered)?;
        match inbound.recv().await {
            Some(conn) => Ok(Box::new(conn)),
            None => Err(PeerlinkError::unreachable("broker endpoint closed")),
        }
    }

    async fn dial(&mut self, remote: &PeerId, _options: DialOptions) -> Result<Box<dyn Connection>> {
        let local = self
            .identity
            .clone()
            .ok_or_else(PeerlinkError::not_registered)?;
        let listener = {
            let registry = self.registry.lock().expect("registry lock poisoned");
            registry.get(remote).cloned()
        };
        let Some(listener) = listener else {
            return Err(PeerlinkError::peer_unavailable(remote.clone()));
        };

        let (ours, theirs) = MemoryConnection::pair(local, remote.clone());
        // A removed-but-not-yet-dropped listener counts as unavailable too.
        listener
            .send(theirs)
            .await
            .map_err(|_| PeerlinkError::peer_unavailable(remote.clone()))?;
        Ok(Box::new(ours))
    }

    async fn close(&mut self) {
        if let Some(id) = self.identity.take() {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            registry.remove(&id);
        }
        self.inbound = None;
    }
}

// ----------------------------------------------------------------------------
// Connection
// ----------------------------------------------------------------------------

/// One end of a crossed in-memory channel pair.
pub struct MemoryConnection {
    remote: PeerId,
    tx: mpsc::Sender<ConnectionEvent>,
    rx: mpsc::Receiver<ConnectionEvent>,
    closed: bool,
    finished: bool,
}

impl MemoryConnection {
    /// Build both ends of a connection between `local` and `remote`. Each
    /// end observes the channel opening as its first event.
    fn pair(local: PeerId, remote: PeerId) -> (Self, Self) {
        let (local_tx, remote_rx) = mpsc::channel(CONNECTION_CAPACITY);
        let (remote_tx, local_rx) = mpsc::channel(CONNECTION_CAPACITY);
        let _ = local_tx.try_send(ConnectionEvent::Opened);
        let _ = remote_tx.try_send(ConnectionEvent::Opened);

        let ours = Self {
            remote,
            tx: local_tx,
            rx: local_rx,
            closed: false,
            finished: false,
        };
        let theirs = Self {
            remote: local,
            tx: remote_tx,
            rx: remote_rx,
            closed: false,
            finished: false,
        };
        (ours, theirs)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn remote(&self) -> &PeerId {
        &self.remote
    }

    async fn send(&mut self, text: &str) -> Result<()> {
        if self.closed {
            return Err(PeerlinkError::already_closed());
        }
        self.tx
            .send(ConnectionEvent::Data(text.to_string()))
            .await
            .map_err(|_| PeerlinkError::already_closed())
    }

    async fn recv(&mut self) -> Option<ConnectionEvent> {
        match self.rx.recv().await {
            Some(event) => Some(event),
            // The remote end dropped without an explicit close; synthesize
            // one Closed event, then report the stream as finished.
            None if !self.finished => {
                self.finished = true;
                Some(ConnectionEvent::Closed)
            }
            None => None,
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.tx.try_send(ConnectionEvent::Closed);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use peerlink_core::{BrokerError, PeerlinkError};

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let network = MemoryNetwork::new();
        let mut first = network.endpoint();
        let mut second = network.endpoint();

        first.register(Some(PeerId::new("h1"))).await.unwrap();
        let err = second.register(Some(PeerId::new("h1"))).await.unwrap_err();
        assert!(matches!(
            err,
            PeerlinkError::Broker(BrokerError::IdentityTaken { .. })
        ));
    }

    #[tokio::test]
    async fn registration_is_released_on_close() {
        let network = MemoryNetwork::new();
        let mut first = network.endpoint();
        first.register(Some(PeerId::new("h1"))).await.unwrap();
        first.close().await;

        let mut second = network.endpoint();
        assert!(second.register(Some(PeerId::new("h1"))).await.is_ok());
    }

    #[tokio::test]
    async fn dialing_an_unknown_identity_fails() {
        let network = MemoryNetwork::new();
        let mut endpoint = network.endpoint();
        endpoint.register(None).await.unwrap();

        let err = endpoint
            .dial(&PeerId::new("nobody"), DialOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PeerlinkError::Broker(BrokerError::PeerUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn dialing_before_registration_fails() {
        let network = MemoryNetwork::new();
        let mut endpoint = network.endpoint();
        let err = endpoint
            .dial(&PeerId::new("h1"), DialOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PeerlinkError::Broker(BrokerError::NotRegistered)
        ));
    }

    #[tokio::test]
    async fn connected_pair_exchanges_data_both_ways() {
        let network = MemoryNetwork::new();
        let mut host = network.endpoint();
        let mut client = network.endpoint();

        let host_id = host.register(Some(PeerId::new("h1"))).await.unwrap();
        client.register(None).await.unwrap();

        let mut dialed = client.dial(&host_id, DialOptions::default()).await.unwrap();
        let mut accepted = host.accept().await.unwrap();

        assert_eq!(dialed.recv().await, Some(ConnectionEvent::Opened));
        assert_eq!(accepted.recv().await, Some(ConnectionEvent::Opened));

        dialed.send("hello").await.unwrap();
        assert_eq!(
            accepted.recv().await,
            Some(ConnectionEvent::Data("hello".to_string()))
        );

        accepted.send("hi back").await.unwrap();
        assert_eq!(
            dialed.recv().await,
            Some(ConnectionEvent::Data("hi back".to_string()))
        );
    }

    #[tokio::test]
    async fn close_notifies_the_remote_end() {
        let network = MemoryNetwork::new();
        let mut host = network.endpoint();
        let mut client = network.endpoint();

        let host_id = host.register(Some(PeerId::new("h1"))).await.unwrap();
        client.register(None).await.unwrap();
        let mut dialed = client.dial(&host_id, DialOptions::default()).await.unwrap();
        let mut accepted = host.accept().await.unwrap();

        assert_eq!(dialed.recv().await, Some(ConnectionEvent::Opened));
        assert_eq!(accepted.recv().await, Some(ConnectionEvent::Opened));

        dialed.close().await;
        assert_eq!(accepted.recv().await, Some(ConnectionEvent::Closed));
        assert!(dialed.send("too late").await.is_err());
    }

    #[tokio::test]
    async fn dropping_one_end_synthesizes_a_close() {
        let network = MemoryNetwork::new();
        let mut host = network.endpoint();
        let mut client = network.endpoint();

        let host_id = host.register(Some(PeerId::new("h1"))).await.unwrap();
        client.register(None).await.unwrap();
        let dialed = client.dial(&host_id, DialOptions::default()).await.unwrap();
        let mut accepted = host.accept().await.unwrap();

        assert_eq!(accepted.recv().await, Some(ConnectionEvent::Opened));
        drop(dialed);
        assert_eq!(accepted.recv().await, Some(ConnectionEvent::Closed));
        assert_eq!(accepted.recv().await, None);
    }
}
