//! Peerlink CLI library: argument parsing, session wiring, event printing.

pub mod app;
pub mod cli;
pub mod error;
