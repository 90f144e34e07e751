//! Peerlink Harness
//!
//! In-process double of the signaling broker and its connections, so
//! sessions can be exercised end to end without a network. Used by the core
//! integration tests and the CLI demo commands.

pub mod memory;

pub use memory::{MemoryBroker, MemoryConnection, MemoryNetwork};
