//! HTTP control API for the portal UI
//!
//! This module provides the REST surface the call screen and the officer
//! dashboard drive:
//! - POST /call/start, /call/end, /call/retry - Session lifecycle
//! - POST /call/mute, /call/quick-action - In-call actions
//! - GET /call/status, /call/transcript - Session read model
//! - GET/POST /voice-requests, POST /voice-requests/:id/decision - Moderation
//! - GET /widget/visibility - Embedded widget allow-list check
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
