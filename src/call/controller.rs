use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{error, info, warn};

use super::config::CallConfig;
use super::error::CallError;
use super::message::{MessageSender, QuickAction, TranscriptEntry};
use super::phase::CallPhase;
use super::snapshot::CallSnapshot;
use crate::context::CallContext;
use crate::vendor::{MessageSource, MicAccess, MicrophoneGateway, VendorEvent, VoiceVendor};

/// Period of the connected-call duration counter
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Mutable state of the one call session the controller owns.
///
/// `generation` identifies the current attempt. Every spawned task and
/// every continuation across a suspension point carries the generation it
/// was started under and re-checks it under this lock before mutating, so
/// late callbacks from a torn-down session are inert.
struct SessionState {
    phase: CallPhase,
    started_at: Option<DateTime<Utc>>,
    duration_secs: u64,
    transcript: Vec<TranscriptEntry>,
    last_error: Option<CallError>,
    remote_speaking: bool,
    recording_indicator: bool,
    generation: u64,
    pump_task: Option<JoinHandle<()>>,
    ticker_task: Option<JoinHandle<()>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: CallPhase::Idle,
            started_at: None,
            duration_secs: 0,
            transcript: Vec::new(),
            last_error: None,
            remote_speaking: false,
            recording_indicator: false,
            generation: 0,
            pump_task: None,
            ticker_task: None,
        }
    }

    /// Clear everything belonging to a single attempt
    fn reset_attempt(&mut self) {
        self.started_at = None;
        self.duration_secs = 0;
        self.transcript.clear();
        self.last_error = None;
        self.remote_speaking = false;
        self.recording_indicator = false;
    }
}

/// Voice session controller
///
/// Owns exactly one call session at a time, mediates between the vendor's
/// asynchronous event stream and the session state, and exposes the
/// imperative action surface the call screen drives.
pub struct CallController {
    config: CallConfig,
    context: CallContext,
    vendor: Arc<Mutex<Box<dyn VoiceVendor>>>,
    microphone: Arc<dyn MicrophoneGateway>,
    state: Arc<Mutex<SessionState>>,
}

impl CallController {
    pub fn new(
        config: CallConfig,
        context: CallContext,
        vendor: Box<dyn VoiceVendor>,
        microphone: Arc<dyn MicrophoneGateway>,
    ) -> Self {
        Self {
            config,
            context,
            vendor: Arc::new(Mutex::new(vendor)),
            microphone,
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    /// Start a new call session
    ///
    /// Fails if a session is already in progress. Classified connection
    /// failures do not return an error here; they surface as the Failed
    /// phase with `last_error` set.
    pub async fn start_session(&self) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().await;
            if state.phase.is_session_active() {
                warn!(
                    "Call session already in progress (phase={})",
                    state.phase.label()
                );
                anyhow::bail!("a call session is already in progress");
            }
            state.generation += 1;
            state.reset_attempt();
            state.phase = CallPhase::RequestingPermission;
            state.generation
        };

        info!("Starting call session (generation={})", generation);
        self.context.start_call();
        self.context.set_duration(0);

        self.connect(generation).await;
        Ok(())
    }

    /// Retry a failed call, re-running the start sequence from the
    /// permission request
    pub async fn retry(&self) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().await;
            if state.phase != CallPhase::Failed {
                warn!(
                    "Retry requested while not failed (phase={})",
                    state.phase.label()
                );
                anyhow::bail!("retry is only valid after a failed call");
            }
            state.generation += 1;
            state.reset_attempt();
            state.phase = CallPhase::RequestingPermission;
            state.generation
        };

        info!("Retrying call session (generation={})", generation);
        self.context.start_call();
        self.context.set_duration(0);

        self.connect(generation).await;
        Ok(())
    }

    /// End the call. Idempotent; always succeeds from the caller's view.
    pub async fn end_session(&self) {
        info!("Ending call session");

        let (pump, ticker) = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.phase = CallPhase::Idle;
            state.reset_attempt();
            (state.pump_task.take(), state.ticker_task.take())
        };

        if let Some(task) = pump {
            task.abort();
        }
        if let Some(task) = ticker {
            task.abort();
        }

        self.teardown_vendor().await;
        self.context.end_call();
    }

    /// Flip the display-only recording indicator.
    ///
    /// The vendor owns the real mute state and keeps transmitting either
    /// way; this only changes what the call screen shows.
    pub async fn toggle_mute(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.phase != CallPhase::Connected {
            warn!("Mute toggled outside a connected call");
            anyhow::bail!("no connected call session");
        }
        state.recording_indicator = !state.recording_indicator;
        info!(
            "Recording indicator {}",
            if state.recording_indicator { "on" } else { "off" }
        );
        Ok(state.recording_indicator)
    }

    /// Echo a quick-action phrase into the transcript as the citizen's
    /// utterance. The live vendor conversation produces any reply.
    pub async fn send_quick_action(&self, action: QuickAction) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.phase != CallPhase::Connected {
            warn!("Quick action {:?} outside a connected call", action);
            anyhow::bail!("no connected call session");
        }
        state
            .transcript
            .push(TranscriptEntry::new(MessageSender::User, action.phrase()));
        info!("Quick action {:?} echoed to transcript", action);
        Ok(())
    }

    /// Current session read model
    pub async fn snapshot(&self) -> CallSnapshot {
        let state = self.state.lock().await;
        CallSnapshot {
            phase: state.phase,
            started_at: state.started_at,
            duration_secs: state.duration_secs,
            transcript_len: state.transcript.len(),
            last_error: state.last_error.clone(),
            remote_speaking: state.remote_speaking,
            recording_indicator: state.recording_indicator,
        }
    }

    /// Accumulated transcript in insertion order
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        let state = self.state.lock().await;
        state.transcript.clone()
    }

    /// Permission request and vendor handshake for one attempt.
    ///
    /// Suspends twice (permission prompt, vendor start); after each
    /// suspension the attempt may have been superseded by `end_session`,
    /// in which case the continuation backs out without touching state.
    async fn connect(&self, generation: u64) {
        match self.microphone.request_access().await {
            MicAccess::Denied { reason } => {
                warn!("Microphone permission denied: {}", reason);
                self.fail(generation, CallError::permission_denied(reason))
                    .await;
                return;
            }
            MicAccess::Granted => {}
        }

        if !self.advance(generation, CallPhase::Connecting).await {
            info!("Call ended during permission request, aborting start");
            return;
        }

        let events = {
            let mut vendor = self.vendor.lock().await;
            match vendor
                .start(&self.config.agent_id, self.config.transport)
                .await
            {
                Ok(events) => events,
                Err(e) => {
                    error!("Vendor session failed to open: {:#}", e);
                    self.fail(generation, CallError::classify(e.to_string()))
                        .await;
                    return;
                }
            }
        };

        // The session just opened must not be left holding the microphone
        // if the attempt was cancelled during the handshake.
        if !self.is_current(generation).await {
            info!("Call ended during vendor handshake, closing fresh session");
            self.teardown_vendor().await;
            return;
        }

        self.spawn_event_pump(generation, events).await;
    }

    async fn spawn_event_pump(&self, generation: u64, mut events: mpsc::Receiver<VendorEvent>) {
        let state = Arc::clone(&self.state);
        let context = self.context.clone();
        let greeting = self.config.greeting.clone();
        let vendor = Arc::clone(&self.vendor);

        let pump = tokio::spawn(async move {
            info!("Vendor event pump started (generation={})", generation);

            while let Some(event) = events.recv().await {
                let mut st = state.lock().await;
                if st.generation != generation {
                    break;
                }

                match event {
                    VendorEvent::Connected => {
                        if st.phase != CallPhase::Connecting {
                            warn!(
                                "Vendor connect acknowledgment in phase {}, ignoring",
                                st.phase.label()
                            );
                            continue;
                        }
                        st.phase = CallPhase::Connected;
                        st.started_at = Some(Utc::now());
                        st.transcript
                            .push(TranscriptEntry::new(MessageSender::Ai, greeting.clone()));
                        context.set_connected(true);
                        info!("Call connected");

                        let ticker =
                            Self::spawn_ticker(Arc::clone(&state), context.clone(), generation);
                        st.ticker_task = Some(ticker);
                    }
                    VendorEvent::Message { source, text } => {
                        if st.phase != CallPhase::Connected {
                            warn!("Vendor message outside a connected call, dropping");
                            continue;
                        }
                        if text.trim().is_empty() {
                            warn!("Dropping empty vendor message");
                            continue;
                        }
                        let sender = match source {
                            MessageSource::Ai => MessageSender::Ai,
                            MessageSource::User => MessageSender::User,
                        };
                        st.transcript.push(TranscriptEntry::new(sender, text));
                    }
                    VendorEvent::SpeakingChanged(speaking) => {
                        st.remote_speaking = speaking;
                    }
                    VendorEvent::Disconnected => {
                        if st.phase != CallPhase::Connected {
                            continue;
                        }
                        st.phase = CallPhase::Disconnected;
                        st.remote_speaking = false;
                        if let Some(task) = st.ticker_task.take() {
                            task.abort();
                        }
                        context.set_connected(false);
                        info!("Vendor disconnected after {}s", st.duration_secs);
                        Self::release_vendor(&vendor).await;
                    }
                    VendorEvent::Error(detail) => {
                        let err = CallError::classify(detail);
                        warn!("Vendor error: {:?} ({})", err.kind, err.detail);
                        st.phase = CallPhase::Failed;
                        st.last_error = Some(err);
                        st.remote_speaking = false;
                        if let Some(task) = st.ticker_task.take() {
                            task.abort();
                        }
                        context.set_connected(false);
                        Self::release_vendor(&vendor).await;
                    }
                }
            }

            info!("Vendor event pump stopped (generation={})", generation);
        });

        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.pump_task = Some(pump);
        } else {
            pump.abort();
        }
    }

    /// One-second duration counter, alive only while Connected.
    ///
    /// The first increment lands a full period after connect, so the
    /// duration reads 0 until one tick elapses. Exits on its own as soon
    /// as the phase leaves Connected or the attempt is superseded, and is
    /// additionally aborted on end-session.
    fn spawn_ticker(
        state: Arc<Mutex<SessionState>>,
        context: CallContext,
        generation: u64,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                ticks.tick().await;
                let mut st = state.lock().await;
                if st.generation != generation || st.phase != CallPhase::Connected {
                    break;
                }
                st.duration_secs += 1;
                context.set_duration(st.duration_secs);
            }
        })
    }

    /// Move to `phase` if the attempt is still current
    async fn advance(&self, generation: u64, phase: CallPhase) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return false;
        }
        state.phase = phase;
        true
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
    }

    /// Mark the attempt failed with a classified error, if still current
    async fn fail(&self, generation: u64, err: CallError) {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return;
        }
        state.phase = CallPhase::Failed;
        state.last_error = Some(err);
        state.remote_speaking = false;
        self.context.set_connected(false);
    }

    /// Release the vendor session (and with it the microphone).
    /// Teardown failures are logged and never surfaced.
    async fn teardown_vendor(&self) {
        Self::release_vendor(&self.vendor).await;
    }

    /// Best-effort vendor stop. Callers that hold the session state lock
    /// may keep holding it: lock order is always state, then vendor.
    async fn release_vendor(vendor: &Mutex<Box<dyn VoiceVendor>>) {
        let mut vendor = vendor.lock().await;
        if !vendor.is_active() {
            return;
        }
        if let Err(e) = vendor.stop().await {
            warn!("Vendor teardown failed: {:#}", e);
        }
    }
}
