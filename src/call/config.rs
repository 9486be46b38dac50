use serde::{Deserialize, Serialize};

use crate::vendor::TransportMode;

/// Seeded assistant greeting, shown as the first transcript entry once the
/// vendor acknowledges the connection.
pub const AMUA_GREETING: &str = "Karibu! Mimi ni Amua, msaidizi wako wa sauti wa KRA. \
Ninaweza kukusaidia na ushuru wako. Unahitaji msaada gani leo?";

/// Configuration for a call session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// Target agent on the voice vendor's side
    pub agent_id: String,

    /// Streaming transport used for the real-time session
    pub transport: TransportMode,

    /// Greeting seeded into the transcript on connect
    pub greeting: String,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            agent_id: "amua-tax-assistant".to_string(),
            transport: TransportMode::WebSocket,
            greeting: AMUA_GREETING.to_string(),
        }
    }
}
