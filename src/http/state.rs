use std::sync::Arc;

use crate::call::CallController;
use crate::context::CallContext;
use crate::moderation::RequestStore;
use crate::widget::WidgetVisibility;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one call-session controller of this process
    pub controller: Arc<CallController>,

    /// Process-wide call context mirror
    pub context: CallContext,

    /// Voice-agent request moderation store
    pub requests: RequestStore,

    /// Allow-list rule the portal shell queries for the embedded widget
    pub widget: WidgetVisibility,
}

impl AppState {
    pub fn new(
        controller: Arc<CallController>,
        context: CallContext,
        requests: RequestStore,
        widget: WidgetVisibility,
    ) -> Self {
        Self {
            controller,
            context,
            requests,
            widget,
        }
    }
}
