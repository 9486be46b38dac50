// Integration tests for the voice session controller
//
// These tests drive the controller with a channel-backed vendor and a
// queued microphone gateway, covering the session lifecycle, mid-start
// cancellation, and error classification end to end. The tokio clock is
// paused so the duration ticker is deterministic.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use gavalink::call::{
    CallConfig, CallController, CallErrorKind, CallPhase, MessageSender, QuickAction,
    AMUA_GREETING,
};
use gavalink::context::CallContext;
use gavalink::vendor::{
    MessageSource, MicAccess, MicrophoneGateway, TransportMode, VendorEvent, VoiceVendor,
};

// ============================================================================
// Test Doubles
// ============================================================================

/// Vendor whose event feed stays in the test's hands
struct ChannelVendor {
    feed: Arc<Mutex<Option<mpsc::Sender<VendorEvent>>>>,
    stopped: Arc<AtomicBool>,
    start_delay: Option<Duration>,
    fail_start: Option<String>,
    active: bool,
}

/// Test-side handle onto a `ChannelVendor`
struct VendorProbe {
    feed: Arc<Mutex<Option<mpsc::Sender<VendorEvent>>>>,
    stopped: Arc<AtomicBool>,
}

impl VendorProbe {
    fn sender(&self) -> mpsc::Sender<VendorEvent> {
        self.feed
            .lock()
            .unwrap()
            .clone()
            .expect("vendor session not open")
    }

    fn is_open(&self) -> bool {
        self.feed.lock().unwrap().is_some()
    }

    fn was_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl ChannelVendor {
    fn new() -> (Self, VendorProbe) {
        let feed = Arc::new(Mutex::new(None));
        let stopped = Arc::new(AtomicBool::new(false));
        (
            Self {
                feed: Arc::clone(&feed),
                stopped: Arc::clone(&stopped),
                start_delay: None,
                fail_start: None,
                active: false,
            },
            VendorProbe { feed, stopped },
        )
    }

    fn failing(detail: &str) -> (Self, VendorProbe) {
        let (mut vendor, probe) = Self::new();
        vendor.fail_start = Some(detail.to_string());
        (vendor, probe)
    }

    fn slow(delay: Duration) -> (Self, VendorProbe) {
        let (mut vendor, probe) = Self::new();
        vendor.start_delay = Some(delay);
        (vendor, probe)
    }
}

#[async_trait::async_trait]
impl VoiceVendor for ChannelVendor {
    async fn start(
        &mut self,
        _agent_id: &str,
        _transport: TransportMode,
    ) -> Result<mpsc::Receiver<VendorEvent>> {
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(detail) = &self.fail_start {
            anyhow::bail!("{}", detail);
        }
        let (tx, rx) = mpsc::channel(100);
        *self.feed.lock().unwrap() = Some(tx);
        self.active = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.active = false;
        self.stopped.store(true, Ordering::SeqCst);
        *self.feed.lock().unwrap() = None;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn name(&self) -> &str {
        "channel"
    }
}

/// Gateway that answers from a queue, then grants
struct QueuedMicrophone {
    answers: Mutex<VecDeque<MicAccess>>,
    delay: Option<Duration>,
}

impl QueuedMicrophone {
    fn granted() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            delay: None,
        }
    }

    fn denying_once(reason: &str) -> Self {
        Self {
            answers: Mutex::new(VecDeque::from([MicAccess::Denied {
                reason: reason.to_string(),
            }])),
            delay: None,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            delay: Some(delay),
        }
    }
}

#[async_trait::async_trait]
impl MicrophoneGateway for QueuedMicrophone {
    async fn request_access(&self) -> MicAccess {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MicAccess::Granted)
    }
}

// ============================================================================
// Harness
// ============================================================================

fn controller_with(
    vendor: ChannelVendor,
    microphone: QueuedMicrophone,
) -> (Arc<CallController>, CallContext) {
    let context = CallContext::new();
    let controller = CallController::new(
        CallConfig::default(),
        context.clone(),
        Box::new(vendor),
        Arc::new(microphone),
    );
    (Arc::new(controller), context)
}

async fn wait_for_phase(controller: &CallController, phase: CallPhase) {
    for _ in 0..100 {
        if controller.snapshot().await.phase == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for phase {:?}", phase);
}

async fn wait_for_transcript_len(controller: &CallController, len: usize) {
    for _ in 0..100 {
        if controller.snapshot().await.transcript_len == len {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for transcript length {}", len);
}

/// Start a session and walk it to Connected
async fn connect(controller: &Arc<CallController>, probe: &VendorProbe) {
    controller.start_session().await.unwrap();
    probe.sender().send(VendorEvent::Connected).await.unwrap();
    wait_for_phase(controller, CallPhase::Connected).await;
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn connect_seeds_greeting_and_mirrors_context() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, context) = controller_with(vendor, QueuedMicrophone::granted());

    controller.start_session().await.unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Connecting);
    assert!(context.is_in_call(), "in-call from the moment of starting");
    assert!(!context.is_connected(), "not connected before the vendor ack");

    probe.sender().send(VendorEvent::Connected).await.unwrap();
    wait_for_phase(&controller, CallPhase::Connected).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.duration_secs, 0, "duration stays 0 until a tick elapses");
    assert!(snapshot.started_at.is_some());
    assert!(context.is_connected());

    let transcript = controller.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].sender, MessageSender::Ai);
    assert_eq!(transcript[0].text, AMUA_GREETING);
}

#[tokio::test(start_paused = true)]
async fn start_while_active_is_rejected() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;

    assert!(controller.start_session().await.is_err());
    assert_eq!(controller.snapshot().await.phase, CallPhase::Connected);
}

#[tokio::test(start_paused = true)]
async fn end_session_resets_everything_and_releases_vendor() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    probe
        .sender()
        .send(VendorEvent::Message {
            source: MessageSource::User,
            text: "Nataka msaada na ushuru".to_string(),
        })
        .await
        .unwrap();
    wait_for_transcript_len(&controller, 2).await;

    controller.end_session().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Idle);
    assert_eq!(snapshot.duration_secs, 0);
    assert_eq!(snapshot.transcript_len, 0);
    assert!(snapshot.last_error.is_none());
    assert!(probe.was_stopped(), "vendor session released on end");

    let context_snapshot = context.snapshot();
    assert!(!context_snapshot.is_in_call);
    assert!(!context_snapshot.is_connected);
    assert_eq!(context_snapshot.duration_secs, 0);

    // Idempotent
    controller.end_session().await;
    assert_eq!(controller.snapshot().await.phase, CallPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn start_after_disconnect_begins_fresh_session() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    probe.sender().send(VendorEvent::Disconnected).await.unwrap();
    wait_for_phase(&controller, CallPhase::Disconnected).await;

    controller.start_session().await.unwrap();
    assert_eq!(controller.snapshot().await.phase, CallPhase::Connecting);
    assert_eq!(controller.snapshot().await.transcript_len, 0);
}

// ============================================================================
// Transcript
// ============================================================================

#[tokio::test(start_paused = true)]
async fn vendor_messages_append_in_arrival_order() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    let sender = probe.sender();

    sender
        .send(VendorEvent::Message {
            source: MessageSource::User,
            text: "Nataka kujaza NIL returns".to_string(),
        })
        .await
        .unwrap();
    sender
        .send(VendorEvent::Message {
            source: MessageSource::Ai,
            text: "Sawa, nitakusaidia.".to_string(),
        })
        .await
        .unwrap();
    // Empty payloads are dropped, not rendered as blank bubbles
    sender
        .send(VendorEvent::Message {
            source: MessageSource::Ai,
            text: "   ".to_string(),
        })
        .await
        .unwrap();
    wait_for_transcript_len(&controller, 3).await;

    let transcript = controller.transcript().await;
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[0].sender, MessageSender::Ai); // greeting
    assert_eq!(transcript[1].sender, MessageSender::User);
    assert_eq!(transcript[1].text, "Nataka kujaza NIL returns");
    assert_eq!(transcript[2].sender, MessageSender::Ai);

    // Ids are unique within the session
    assert_ne!(transcript[0].id, transcript[1].id);
    assert_ne!(transcript[1].id, transcript[2].id);
}

#[tokio::test(start_paused = true)]
async fn speaking_changes_toggle_the_indicator() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    let sender = probe.sender();

    sender.send(VendorEvent::SpeakingChanged(true)).await.unwrap();
    for _ in 0..10 {
        if controller.snapshot().await.remote_speaking {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(controller.snapshot().await.remote_speaking);

    sender.send(VendorEvent::SpeakingChanged(false)).await.unwrap();
    for _ in 0..10 {
        if !controller.snapshot().await.remote_speaking {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!controller.snapshot().await.remote_speaking);
}

#[tokio::test(start_paused = true)]
async fn quick_action_appends_exactly_one_user_message() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;

    controller
        .send_quick_action(QuickAction::NilReturn)
        .await
        .unwrap();

    let transcript = controller.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].sender, MessageSender::User);
    assert_eq!(transcript[1].text, "Nataka kujaza NIL returns");

    // No reply is synthesized locally; the live conversation answers
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(controller.snapshot().await.transcript_len, 2);
}

#[tokio::test(start_paused = true)]
async fn in_call_actions_require_a_connected_call() {
    let (vendor, _probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    assert!(controller
        .send_quick_action(QuickAction::GeneralHelp)
        .await
        .is_err());
    assert!(controller.toggle_mute().await.is_err());
    assert!(controller.retry().await.is_err(), "retry only valid from failed");
}

#[tokio::test(start_paused = true)]
async fn toggle_mute_is_display_only() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;

    assert!(controller.toggle_mute().await.unwrap());
    assert!(controller.snapshot().await.recording_indicator);
    assert!(!controller.toggle_mute().await.unwrap());

    // The vendor session is untouched either way
    assert!(!probe.was_stopped());
    assert!(probe.is_open());
}

// ============================================================================
// Duration
// ============================================================================

#[tokio::test(start_paused = true)]
async fn duration_ticks_while_connected_and_freezes_on_disconnect() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    assert_eq!(controller.snapshot().await.duration_secs, 0);

    tokio::time::sleep(Duration::from_secs(5)).await;
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert_eq!(controller.snapshot().await.duration_secs, 5);
    assert_eq!(context.duration_secs(), 5);

    probe.sender().send(VendorEvent::Disconnected).await.unwrap();
    wait_for_phase(&controller, CallPhase::Disconnected).await;

    // Frozen, not reset
    tokio::time::sleep(Duration::from_secs(3)).await;
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert_eq!(controller.snapshot().await.duration_secs, 5);
    assert!(!context.is_connected());
    assert!(context.is_in_call(), "still in-call until the citizen hangs up");
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn end_during_permission_request_cancels_the_start() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, context) =
        controller_with(vendor, QueuedMicrophone::slow(Duration::from_secs(5)));

    let starter = Arc::clone(&controller);
    let handle = tokio::spawn(async move { starter.start_session().await });
    wait_for_phase(&controller, CallPhase::RequestingPermission).await;

    controller.end_session().await;
    handle.await.unwrap().unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Idle);
    assert_eq!(snapshot.transcript_len, 0);
    assert!(!context.is_in_call());
    assert!(!probe.is_open(), "vendor session was never opened");
}

#[tokio::test(start_paused = true)]
async fn end_during_vendor_handshake_releases_the_fresh_session() {
    let (vendor, probe) = ChannelVendor::slow(Duration::from_secs(3));
    let (controller, context) = controller_with(vendor, QueuedMicrophone::granted());

    let starter = Arc::clone(&controller);
    let handle = tokio::spawn(async move { starter.start_session().await });
    wait_for_phase(&controller, CallPhase::Connecting).await;

    controller.end_session().await;
    handle.await.unwrap().unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Idle);
    assert!(
        probe.was_stopped(),
        "session opened mid-cancellation must be torn down, not leak the microphone"
    );
    assert!(!context.is_in_call());
}

#[tokio::test(start_paused = true)]
async fn late_events_after_end_are_discarded() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    let stale_sender = probe.sender();

    controller.end_session().await;

    let _ = stale_sender
        .send(VendorEvent::Message {
            source: MessageSource::Ai,
            text: "too late".to_string(),
        })
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Idle);
    assert_eq!(snapshot.transcript_len, 0, "torn-down session cannot mutate state");
}

// ============================================================================
// Failure and Retry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn permission_denied_fails_then_retry_connects() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, context) = controller_with(
        vendor,
        QueuedMicrophone::denying_once("citizen dismissed the prompt"),
    );

    controller.start_session().await.unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Failed);
    assert_eq!(
        snapshot.last_error.as_ref().unwrap().kind,
        CallErrorKind::PermissionDenied
    );
    assert_eq!(snapshot.transcript_len, 0, "failed attempts retain no transcript");
    assert!(context.is_in_call(), "still in-call while showing the failure");

    // Second prompt is granted
    controller.retry().await.unwrap();
    probe.sender().send(VendorEvent::Connected).await.unwrap();
    wait_for_phase(&controller, CallPhase::Connected).await;

    let snapshot = controller.snapshot().await;
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.transcript_len, 1, "exactly the seeded greeting");
}

#[tokio::test(start_paused = true)]
async fn vendor_start_failure_is_classified() {
    let (vendor, _probe) = ChannelVendor::failing("quota exceeded for voice minutes");
    let (controller, _context) = controller_with(vendor, QueuedMicrophone::granted());

    controller.start_session().await.unwrap();

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, CallPhase::Failed);
    assert_eq!(
        snapshot.last_error.as_ref().unwrap().kind,
        CallErrorKind::QuotaExhausted
    );
}

#[tokio::test(start_paused = true)]
async fn vendor_error_event_fails_the_call_but_keeps_the_transcript() {
    let (vendor, probe) = ChannelVendor::new();
    let (controller, context) = controller_with(vendor, QueuedMicrophone::granted());

    connect(&controller, &probe).await;
    probe
        .sender()
        .send(VendorEvent::Error(
            "connection reset while streaming".to_string(),
        ))
        .await
        .unwrap();
    wait_for_phase(&controller, CallPhase::Failed).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(
        snapshot.last_error.as_ref().unwrap().kind,
        CallErrorKind::NetworkFailure
    );
    assert_eq!(snapshot.transcript_len, 1, "mid-call failure keeps what was said");
    assert!(!context.is_connected());
    assert!(context.is_in_call());
}
