//! Session configuration

use serde::{Deserialize, Serialize};

use crate::broker::DialOptions;

/// Tunables for a single session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Dial with the transport's reliable delivery mode.
    pub reliable: bool,
    /// Buffer size of the outbound event channel.
    pub event_buffer: usize,
    /// Buffer size of the relay command channel.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reliable: true,
            event_buffer: 64,
            command_buffer: 16,
        }
    }
}

impl SessionConfig {
    pub(crate) fn dial_options(&self) -> DialOptions {
        DialOptions {
            reliable: self.reliable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dials_reliable() {
        let config = SessionConfig::default();
        assert!(config.dial_options().reliable);
        assert!(config.event_buffer > 0);
        assert!(config.command_buffer > 0);
    }
}
