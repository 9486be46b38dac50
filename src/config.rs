use anyhow::Result;
use serde::Deserialize;

use crate::call::CallConfig;
use crate::vendor::TransportMode;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub voice: VoiceConfig,
    pub widget: WidgetConfig,
    pub nats: NatsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct VoiceConfig {
    /// Vendor selection; "scripted" is the built-in simulator
    pub vendor: String,
    pub agent_id: String,
    pub transport: TransportMode,
}

impl VoiceConfig {
    pub fn call_config(&self) -> CallConfig {
        CallConfig {
            agent_id: self.agent_id.clone(),
            transport: self.transport,
            ..CallConfig::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WidgetConfig {
    /// Routes where the embedded voice widget is visible
    pub routes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub enabled: bool,
    pub url: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
