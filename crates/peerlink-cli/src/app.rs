//! Application wiring for the demo and chat commands
//!
//! Both commands run a host and a client session in one process over the
//! in-memory broker network, printing each side's event stream with a role
//! prefix. The chat command wires stdin to the client's send path; the demo
//! command scripts the canonical ping/pong exchange.

use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use peerlink_core::{EventReceiver, PeerId, Session, SessionConfig, SessionEvent};
use peerlink_harness::MemoryNetwork;

use crate::error::{CliError, Result};

/// How long to wait for registrations and channel opens before giving up.
const SETUP_DEADLINE: Duration = Duration::from_secs(5);

// ----------------------------------------------------------------------------
// Event Printing
// ----------------------------------------------------------------------------

/// Print one side's event stream until it ends.
fn spawn_printer(role: &'static str, mut events: EventReceiver, json: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if json {
                let line = serde_json::json!({ "role": role, "event": event });
                println!("{line}");
                continue;
            }
            match event {
                SessionEvent::Status(status) => println!("[{role}] status: {status}"),
                SessionEvent::Log(entry) => println!("[{role}] {entry}"),
                SessionEvent::Message(text) => debug!(role, %text, "message delivered"),
                SessionEvent::Control(signal) => println!("[{role}] control: {signal:?}"),
            }
        }
    })
}

// ----------------------------------------------------------------------------
// Session Wiring
// ----------------------------------------------------------------------------

async fn wait_for(what: &str, cond: impl Fn() -> bool) -> Result<()> {
    let deadline = tokio::time::Instant::now() + SETUP_DEADLINE;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            return Err(CliError::Timeout(what.to_string()));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Ok(())
}

/// Start a host and a client on one network and wait until the channel is
/// open on both sides.
async fn start_pair(
    host_id: &str,
    json: bool,
) -> Result<(Session, Session, JoinHandle<()>, JoinHandle<()>)> {
    let host_id = PeerId::from_str(host_id)?;
    let network = MemoryNetwork::new();

    let (host, host_events) = Session::start_as_host(
        network.endpoint(),
        host_id.clone(),
        SessionConfig::default(),
    );
    let host_printer = spawn_printer("host", host_events, json);
    wait_for("host registration", || host.local_id().is_some()).await?;

    let (client, client_events) =
        Session::connect_to_host(network.endpoint(), host_id, SessionConfig::default());
    let client_printer = spawn_printer("client", client_events, json);
    wait_for("both sides connected", || {
        host.is_connected() && client.is_connected()
    })
    .await?;

    Ok((host, client, host_printer, client_printer))
}

async fn teardown(
    mut host: Session,
    mut client: Session,
    host_printer: JoinHandle<()>,
    client_printer: JoinHandle<()>,
) {
    client.disconnect().await;
    host.disconnect().await;
    let _ = tokio::join!(host_printer, client_printer);
}

// ----------------------------------------------------------------------------
// Commands
// ----------------------------------------------------------------------------

/// Scripted exchange: the client sends the canonical commands and the host's
/// dispatcher answers.
pub async fn run_demo(host_id: &str, json: bool) -> Result<()> {
    let (host, client, host_printer, client_printer) = start_pair(host_id, json).await?;

    info!("channel open, sending demo commands");
    client.send_message("PING").await?;
    client.send_message("LED_ON").await?;
    client.send_message("START").await?;
    client.send_message("hello from the demo client").await?;

    // Give the relays a moment to finish the exchange before tearing down.
    tokio::time::sleep(Duration::from_millis(200)).await;

    teardown(host, client, host_printer, client_printer).await;
    Ok(())
}

/// Interactive session: each stdin line is sent from the client side.
pub async fn run_chat(host_id: &str, json: bool) -> Result<()> {
    let (host, client, host_printer, client_printer) = start_pair(host_id, json).await?;

    println!("type a line to send it from the client; /status shows both sides, /quit exits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "/quit" => break,
            "/status" => {
                println!(
                    "host: {:?} | client: {:?}",
                    host.state(),
                    client.state()
                );
            }
            _ => {
                if let Err(err) = client.send_message(line).await {
                    println!("send failed: {err}");
                }
            }
        }
    }

    teardown(host, client, host_printer, client_printer).await;
    Ok(())
}
