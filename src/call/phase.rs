use serde::{Deserialize, Serialize};

/// Position of a call session in its connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPhase {
    Idle,
    RequestingPermission,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl Default for CallPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl CallPhase {
    /// Whether a session attempt is currently in progress.
    ///
    /// Disconnected and Failed are terminal for the attempt: the session is
    /// over but its state (frozen duration, transcript, error) is still on
    /// display until the next start.
    pub fn is_session_active(&self) -> bool {
        matches!(
            self,
            CallPhase::RequestingPermission | CallPhase::Connecting | CallPhase::Connected
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            CallPhase::Idle => "idle",
            CallPhase::RequestingPermission => "requesting_permission",
            CallPhase::Connecting => "connecting",
            CallPhase::Connected => "connected",
            CallPhase::Disconnected => "disconnected",
            CallPhase::Failed => "failed",
        }
    }
}
