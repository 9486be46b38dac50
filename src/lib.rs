pub mod call;
pub mod config;
pub mod context;
pub mod http;
pub mod moderation;
pub mod nats;
pub mod vendor;
pub mod widget;

pub use call::{
    CallConfig, CallController, CallError, CallErrorKind, CallPhase, CallSnapshot, MessageSender,
    QuickAction, TranscriptEntry, AMUA_GREETING,
};
pub use config::Config;
pub use context::{CallContext, CallContextSnapshot, FloatingIndicator, IndicatorView};
pub use http::{create_router, AppState};
pub use moderation::{
    Decision, ModerationError, NewVoiceRequest, RequestCounts, RequestPriority, RequestStatus,
    RequestStore, VoiceRequest,
};
pub use nats::{RequestEventsClient, VoiceRequestEvent};
pub use vendor::{
    MessageSource, MicAccess, MicrophoneGateway, ScriptStep, ScriptedVendor,
    StaticMicrophoneGateway, TransportMode, VendorEvent, VendorFactory, VoiceVendor,
};
pub use widget::{EmbeddedWidget, WidgetVisibility};
