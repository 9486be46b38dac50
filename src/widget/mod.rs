//! Route-driven visibility for the embedded third-party voice widget
//!
//! The hosted widget element is injected by the vendor's script tag and
//! should only be visible on the public and citizen-facing routes. This is
//! a pure reactive rule over the current route path; the widget element
//! may be absent (e.g. the script has not loaded), in which case applying
//! the rule is a no-op.

use tracing::debug;

/// Default allow-list: the landing page and the citizen dashboard tree
pub const DEFAULT_WIDGET_ROUTES: &[&str] = &["/", "/citizen"];

/// Display state of the injected widget element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbeddedWidget {
    pub visible: bool,
}

/// Allow-list visibility rule for the embedded voice widget
#[derive(Debug, Clone)]
pub struct WidgetVisibility {
    routes: Vec<String>,
}

impl WidgetVisibility {
    pub fn new(routes: Vec<String>) -> Self {
        Self { routes }
    }

    /// Whether the widget should be shown on `path`.
    ///
    /// The root route matches exactly; every other allow-list entry is a
    /// prefix match.
    pub fn is_visible(&self, path: &str) -> bool {
        self.routes.iter().any(|route| {
            if route == "/" {
                path == "/"
            } else {
                path.starts_with(route.as_str())
            }
        })
    }

    /// Apply the rule to the widget element, tolerating its absence
    pub fn apply(&self, path: &str, widget: Option<&mut EmbeddedWidget>) {
        let Some(widget) = widget else {
            return;
        };
        widget.visible = self.is_visible(path);
        debug!(
            "Voice widget {} on {}",
            if widget.visible { "shown" } else { "hidden" },
            path
        );
    }
}

impl Default for WidgetVisibility {
    fn default() -> Self {
        Self::new(
            DEFAULT_WIDGET_ROUTES
                .iter()
                .map(|r| r.to_string())
                .collect(),
        )
    }
}
