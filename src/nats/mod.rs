pub mod client;
pub mod messages;

pub use client::RequestEventsClient;
pub use messages::VoiceRequestEvent;
