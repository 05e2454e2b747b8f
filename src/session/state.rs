//! Lifecycle states of a persistent ExifTool session.

/// State of a batch worker session.
///
/// Transitions:
/// - Created -> Running (worker spawned and answered the handshake)
/// - Running -> Running (each successful `execute`)
/// - Running -> ShuttingDown -> Closed (explicit shutdown, drop, or a
///   response timeout that left the protocol out of sync)
///
/// Closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Process spawned, handshake not yet complete
    Created,
    /// Handshake complete, accepting commands
    Running,
    /// Shutdown directive sent, waiting for the worker to exit
    ShuttingDown,
    /// Worker gone and pipes released (terminal state)
    Closed,
}

impl SessionState {
    pub fn accepts_commands(self) -> bool {
        self == SessionState::Running
    }

    pub fn is_disposed(self) -> bool {
        matches!(self, SessionState::ShuttingDown | SessionState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_accepts_commands() {
        assert!(SessionState::Running.accepts_commands());
        assert!(!SessionState::Created.accepts_commands());
        assert!(!SessionState::ShuttingDown.accepts_commands());
        assert!(!SessionState::Closed.accepts_commands());
    }

    #[test]
    fn shutting_down_and_closed_are_disposed() {
        assert!(SessionState::ShuttingDown.is_disposed());
        assert!(SessionState::Closed.is_disposed());
        assert!(!SessionState::Running.is_disposed());
        assert!(!SessionState::Created.is_disposed());
    }
}
