//! Table-driven handling of recognized inbound payloads
//!
//! A pure mapping from payload text to an outcome; applying the outcome
//! (replying, surfacing a control signal, logging an unrecognized line) is
//! the relay's job.

use serde::{Deserialize, Serialize};

/// External control actions a recognized payload can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSignal {
    /// "LED_ON": switch the simulated actuator on.
    ActuatorOn,
    /// "LED_OFF": switch the simulated actuator off.
    ActuatorOff,
    /// "START": begin application-defined work.
    Start,
    /// "STOP": halt application-defined work.
    Stop,
}

/// Outcome of dispatching one inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Send the given payload back on the same connection.
    Reply(&'static str),
    /// Surface a control signal to the application.
    Signal(ControlSignal),
    /// Payload is not in the command table; log it and do nothing else.
    Unrecognized,
}

/// Map an inbound payload to its outcome.
///
/// Exact case-sensitive match, single dispatch: a payload triggers at most
/// one outcome.
pub fn dispatch(payload: &str) -> DispatchOutcome {
    match payload {
        "LED_ON" => DispatchOutcome::Signal(ControlSignal::ActuatorOn),
        "LED_OFF" => DispatchOutcome::Signal(ControlSignal::ActuatorOff),
        "PING" => DispatchOutcome::Reply("PONG"),
        "START" => DispatchOutcome::Signal(ControlSignal::Start),
        "STOP" => DispatchOutcome::Signal(ControlSignal::Stop),
        _ => DispatchOutcome::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_table() {
        assert_eq!(
            dispatch("LED_ON"),
            DispatchOutcome::Signal(ControlSignal::ActuatorOn)
        );
        assert_eq!(
            dispatch("LED_OFF"),
            DispatchOutcome::Signal(ControlSignal::ActuatorOff)
        );
        assert_eq!(dispatch("PING"), DispatchOutcome::Reply("PONG"));
        assert_eq!(
            dispatch("START"),
            DispatchOutcome::Signal(ControlSignal::Start)
        );
        assert_eq!(
            dispatch("STOP"),
            DispatchOutcome::Signal(ControlSignal::Stop)
        );
    }

    #[test]
    fn match_is_case_sensitive_and_exact() {
        assert_eq!(dispatch("ping"), DispatchOutcome::Unrecognized);
        assert_eq!(dispatch("Ping"), DispatchOutcome::Unrecognized);
        assert_eq!(dispatch("PING "), DispatchOutcome::Unrecognized);
        assert_eq!(dispatch(" PING"), DispatchOutcome::Unrecognized);
        assert_eq!(dispatch("PINGPONG"), DispatchOutcome::Unrecognized);
    }

    #[test]
    fn everything_else_is_unrecognized() {
        assert_eq!(dispatch(""), DispatchOutcome::Unrecognized);
        assert_eq!(dispatch("PONG"), DispatchOutcome::Unrecognized);
        assert_eq!(dispatch("hello"), DispatchOutcome::Unrecognized);
    }
}
