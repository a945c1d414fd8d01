//! A client that records events through `tracing`.

use std::fmt;

use scopestack_types::{Breadcrumb, Event, EventId, Level};

use crate::{Clienter, Scope};

/// Hook run on every breadcrumb before it is stored. Returning `None` drops it.
pub type BeforeBreadcrumb = Box<dyn Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync>;

/// Emits each captured event, with the scope applied, as one `tracing` event
/// under the `scopestack::event` target.
#[derive(Default)]
pub struct TracingClient {
    before_breadcrumb: Option<BeforeBreadcrumb>,
}

impl fmt::Debug for TracingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingClient")
            .field("before_breadcrumb", &self.before_breadcrumb.is_some())
            .finish()
    }
}

impl TracingClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before_breadcrumb<F>(mut self, hook: F) -> Self
    where
        F: Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync + 'static,
    {
        self.before_breadcrumb = Some(Box::new(hook));
        self
    }
}

impl Clienter for TracingClient {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb, scope: &mut Scope) {
        let breadcrumb = match &self.before_breadcrumb {
            Some(hook) => match hook(breadcrumb) {
                Some(breadcrumb) => breadcrumb,
                None => {
                    tracing::trace!("Breadcrumb dropped by before_breadcrumb hook");
                    return;
                }
            },
            None => breadcrumb,
        };
        scope.add_breadcrumb(breadcrumb);
    }

    fn capture_event(&self, event: &Event, scope: &Scope) -> Option<EventId> {
        let event = scope.apply_to_event(event.clone());
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(event_id = %event.event_id, "Failed to serialize event ({e})");
                return None;
            }
        };
        let message = event.message.as_deref().unwrap_or("<no message>");
        let event_id = event.event_id;

        match event.level {
            Level::Fatal | Level::Error => {
                tracing::error!(target: "scopestack::event", %event_id, %payload, "{message}");
            }
            Level::Warning => {
                tracing::warn!(target: "scopestack::event", %event_id, %payload, "{message}");
            }
            Level::Info => {
                tracing::info!(target: "scopestack::event", %event_id, %payload, "{message}");
            }
            Level::Debug => {
                tracing::debug!(target: "scopestack::event", %event_id, %payload, "{message}");
            }
        }
        Some(event_id)
    }
}
