use serde::Serialize;

use super::CallContext;

/// What the minimized call affordance renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorView {
    pub connected: bool,

    /// "Live na Amua" once connected, "Connecting..." before that
    pub status_label: String,

    /// MM:SS, shown only while connected
    pub duration_label: Option<String>,
}

/// Persistent minimized call affordance, visible on every screen except
/// the dedicated call screen while a call is in progress.
///
/// Reads the call context only; dismissal issues `end_call` and nothing
/// else. Visibility must be recomputed on every route change and every
/// context update.
pub struct FloatingIndicator {
    context: CallContext,
    call_route: String,
}

impl FloatingIndicator {
    pub fn new(context: CallContext, call_route: impl Into<String>) -> Self {
        Self {
            context,
            call_route: call_route.into(),
        }
    }

    /// Compute the indicator for the current route; None means hidden.
    pub fn view(&self, current_route: &str) -> Option<IndicatorView> {
        let snapshot = self.context.snapshot();

        if !snapshot.is_in_call || current_route == self.call_route {
            return None;
        }

        let (status_label, duration_label) = if snapshot.is_connected {
            (
                "Live na Amua".to_string(),
                Some(format_duration(snapshot.duration_secs)),
            )
        } else {
            ("Connecting...".to_string(), None)
        };

        Some(IndicatorView {
            connected: snapshot.is_connected,
            status_label,
            duration_label,
        })
    }

    /// Explicit user dismissal
    pub fn dismiss(&self) {
        self.context.end_call();
    }
}

/// MM:SS display formatting
pub fn format_duration(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}
