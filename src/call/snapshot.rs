use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::CallError;
use super::phase::CallPhase;

/// Read model of the current call session, the whole contract the call
/// screen renders from
#[derive(Debug, Clone, Serialize)]
pub struct CallSnapshot {
    pub phase: CallPhase,

    /// When the session first reached Connected
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds spent connected; frozen on disconnect until a new session
    pub duration_secs: u64,

    /// Number of transcript entries accumulated so far
    pub transcript_len: usize,

    /// Present only while the phase is Failed
    pub last_error: Option<CallError>,

    /// Whether the assistant is currently emitting audio
    pub remote_speaking: bool,

    /// Display-only recording indicator; the vendor owns the real mute state
    pub recording_indicator: bool,
}
