//! Officer-side moderation of voice-agent requests
//!
//! The live assistant files structured requests (NIL filing, balance
//! checks, document uploads) that officers approve or reject with notes.
//! Changes fan out on the NATS live-update channel so officer dashboards
//! refresh without polling.

mod store;

pub use store::{
    Decision, ModerationError, NewVoiceRequest, RequestCounts, RequestPriority, RequestStatus,
    RequestStore, VoiceRequest,
};
