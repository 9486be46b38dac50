use serde::Serialize;

/// Classified connection failure, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallErrorKind {
    PermissionDenied,
    QuotaExhausted,
    AuthFailure,
    NetworkFailure,
    Unknown,
}

/// A classified call failure with a citizen-facing message
///
/// The raw vendor detail is retained for logs; external surfaces expose
/// only the kind and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct CallError {
    pub kind: CallErrorKind,
    pub message: String,
    #[serde(skip)]
    pub detail: String,
}

impl CallError {
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::PermissionDenied,
            message: "Microphone access was denied. Grant microphone access and try again."
                .to_string(),
            detail: reason.into(),
        }
    }

    /// Classify a raw vendor error into the taxonomy.
    ///
    /// Substring heuristics on the vendor detail, case-insensitive. The
    /// priority order (quota, then auth, then network) is load-bearing:
    /// a detail mentioning both quota and network classifies as quota.
    pub fn classify(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let lower = detail.to_lowercase();

        let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        let (kind, message) = if contains_any(&["quota", "credit", "limit"]) {
            (
                CallErrorKind::QuotaExhausted,
                "The voice service is out of credit. Top up the voice service account to continue.",
            )
        } else if contains_any(&["unauthorized", "401", "api key", "api-key", "apikey"]) {
            (
                CallErrorKind::AuthFailure,
                "The voice service rejected our credentials. Check the service API key.",
            )
        } else if contains_any(&["network", "fetch", "connection"]) {
            (
                CallErrorKind::NetworkFailure,
                "Could not reach the voice service. Check your internet connection and retry.",
            )
        } else {
            (
                CallErrorKind::Unknown,
                "Something went wrong starting the call. Please try again later.",
            )
        };

        Self {
            kind,
            message: message.to_string(),
            detail,
        }
    }
}
