use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which party a transcript entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Ai,
    User,
}

/// A single displayed conversation message for the current session
///
/// Ordering is insertion order; the timestamp is for display formatting
/// only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Unique within a session
    pub id: Uuid,

    pub sender: MessageSender,

    /// Non-empty display text
    pub text: String,

    /// When the entry was created
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(sender: MessageSender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Predefined shortcuts that insert a canned citizen utterance into the
/// transcript. The live assistant picks the request up from the audio
/// stream; no reply is synthesized locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    NilReturn,
    CheckBalance,
    UploadDocument,
    GeneralHelp,
}

impl QuickAction {
    /// Fixed Swahili phrase shown as the citizen's utterance
    pub fn phrase(&self) -> &'static str {
        match self {
            QuickAction::NilReturn => "Nataka kujaza NIL returns",
            QuickAction::CheckBalance => "Nataka kukagua salio langu",
            QuickAction::UploadDocument => "Nataka kutuma hati",
            QuickAction::GeneralHelp => "Nahitaji msaada",
        }
    }
}
