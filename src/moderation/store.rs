use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::nats::RequestEventsClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Low,
    Normal,
    Medium,
    High,
}

impl Default for RequestPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// A structured request the assistant filed on a citizen's behalf,
/// awaiting an officer's decision
#[derive(Debug, Clone, Serialize)]
pub struct VoiceRequest {
    pub id: Uuid,
    pub user_id: String,
    pub request_type: String,
    pub description: String,
    pub priority: RequestPriority,
    pub status: RequestStatus,
    pub officer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload from the assistant pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct NewVoiceRequest {
    pub user_id: String,
    pub request_type: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<RequestPriority>,
}

/// An officer's verdict on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// Dashboard stat-card counts
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RequestCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("request {0} not found")]
    NotFound(Uuid),
    #[error("request {0} has already been decided")]
    AlreadyDecided(Uuid),
}

/// In-memory store of voice-agent requests (request_id → record)
///
/// Durability is the backing data store's concern; this process keeps the
/// working set and fans changes out on the live-update channel.
#[derive(Clone)]
pub struct RequestStore {
    requests: Arc<RwLock<HashMap<Uuid, VoiceRequest>>>,
    events: Option<Arc<RequestEventsClient>>,
}

impl RequestStore {
    pub fn new(events: Option<Arc<RequestEventsClient>>) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// File a new request. Requests start pending with normal priority
    /// unless the assistant set one.
    pub async fn submit(&self, new: NewVoiceRequest) -> Result<VoiceRequest, ModerationError> {
        if new.user_id.trim().is_empty() {
            return Err(ModerationError::MissingField("user_id"));
        }
        if new.request_type.trim().is_empty() {
            return Err(ModerationError::MissingField("request_type"));
        }
        if new.description.trim().is_empty() {
            return Err(ModerationError::MissingField("description"));
        }

        let now = Utc::now();
        let request = VoiceRequest {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            request_type: new.request_type,
            description: new.description,
            priority: new.priority.unwrap_or_default(),
            status: RequestStatus::Pending,
            officer_notes: None,
            created_at: now,
            updated_at: now,
        };

        {
            let mut requests = self.requests.write().await;
            requests.insert(request.id, request.clone());
        }

        info!(
            "Voice request {} filed ({} for {})",
            request.id, request.request_type, request.user_id
        );
        self.publish(&request).await;

        Ok(request)
    }

    /// All requests, newest first
    pub async fn list(&self) -> Vec<VoiceRequest> {
        let requests = self.requests.read().await;
        let mut all: Vec<VoiceRequest> = requests.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub async fn get(&self, id: Uuid) -> Option<VoiceRequest> {
        let requests = self.requests.read().await;
        requests.get(&id).cloned()
    }

    /// Record an officer's decision on a pending request
    pub async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        officer_notes: Option<String>,
    ) -> Result<VoiceRequest, ModerationError> {
        let updated = {
            let mut requests = self.requests.write().await;
            let request = requests.get_mut(&id).ok_or(ModerationError::NotFound(id))?;

            if request.status != RequestStatus::Pending {
                return Err(ModerationError::AlreadyDecided(id));
            }

            request.status = match decision {
                Decision::Approved => RequestStatus::Approved,
                Decision::Rejected => RequestStatus::Rejected,
            };
            request.officer_notes = officer_notes.filter(|n| !n.trim().is_empty());
            request.updated_at = Utc::now();
            request.clone()
        };

        info!(
            "Voice request {} {}",
            updated.id,
            updated.status.label()
        );
        self.publish(&updated).await;

        Ok(updated)
    }

    /// Counts for the officer dashboard stat cards
    pub async fn counts(&self) -> RequestCounts {
        let requests = self.requests.read().await;
        let mut counts = RequestCounts {
            total: requests.len(),
            pending: 0,
            approved: 0,
            rejected: 0,
        };
        for request in requests.values() {
            match request.status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Approved => counts.approved += 1,
                RequestStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    /// Best-effort fan-out; the store never depends on the broker
    async fn publish(&self, request: &VoiceRequest) {
        let Some(events) = &self.events else {
            return;
        };
        if let Err(e) = events.publish_request_event(request).await {
            error!("Failed to publish voice request event: {:#}", e);
        }
    }
}
