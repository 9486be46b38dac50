use serde::{Deserialize, Serialize};

use crate::moderation::{RequestPriority, RequestStatus, VoiceRequest};

/// Voice request change event published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceRequestEvent {
    pub request_id: String,
    pub user_id: String,
    pub request_type: String,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub officer_notes: Option<String>,
    pub timestamp: String, // RFC3339 timestamp
}

impl From<&VoiceRequest> for VoiceRequestEvent {
    fn from(request: &VoiceRequest) -> Self {
        Self {
            request_id: request.id.to_string(),
            user_id: request.user_id.clone(),
            request_type: request.request_type.clone(),
            status: request.status,
            priority: request.priority,
            officer_notes: request.officer_notes.clone(),
            timestamp: request.updated_at.to_rfc3339(),
        }
    }
}
