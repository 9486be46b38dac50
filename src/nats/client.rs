use anyhow::{Context, Result};
use async_nats::Client;
use tracing::info;

use crate::moderation::VoiceRequest;

use super::messages::VoiceRequestEvent;

/// Live-update channel for voice-agent requests.
///
/// Officer dashboards subscribe here instead of polling the request list;
/// every submit and every decision is published as a change event.
pub struct RequestEventsClient {
    client: Client,
}

impl RequestEventsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Publish a change event for a request
    pub async fn publish_request_event(&self, request: &VoiceRequest) -> Result<()> {
        let subject = format!("gavalink.voice.requests.{}", request.status.label());

        let event = VoiceRequestEvent::from(request);
        let payload = serde_json::to_vec(&event)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish voice request event")?;

        info!(
            "Published request event to {} (request={}, status={})",
            subject,
            event.request_id,
            request.status.label()
        );

        Ok(())
    }

    /// Subscribe to request change events across all statuses
    pub async fn subscribe_events(&self) -> Result<async_nats::Subscriber> {
        let subject = "gavalink.voice.requests.>";

        info!("Subscribing to request events on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to request events")?;

        info!("Subscribed to {}", subject);

        Ok(subscriber)
    }
}
