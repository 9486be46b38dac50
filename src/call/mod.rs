//! Call session management
//!
//! This module provides the voice-call core:
//! - Session phase lifecycle and transitions
//! - The session controller mediating vendor events and user actions
//! - Transcript entries and quick-action phrases
//! - Classified connection errors
//! - The read model the call screen renders from

mod config;
mod controller;
mod error;
mod message;
mod phase;
mod snapshot;

pub use config::{CallConfig, AMUA_GREETING};
pub use controller::CallController;
pub use error::{CallError, CallErrorKind};
pub use message::{MessageSender, QuickAction, TranscriptEntry};
pub use phase::CallPhase;
pub use snapshot::CallSnapshot;
