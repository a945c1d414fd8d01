//! The capability a hub dispatches to.

use std::error::Error;

use scopestack_types::{Breadcrumb, Event, EventId};

use crate::Scope;

/// Anything that can record events on behalf of a hub.
///
/// The hub hands over the scope of its top layer with every call and never
/// inspects the result beyond remembering a returned [`EventId`]. Transport,
/// sampling and failure handling all belong to the implementor.
///
/// Clients are shared between layers via `Arc`, so implementations must be
/// safe to call from several threads at once.
pub trait Clienter: Send + Sync {
    /// Records a breadcrumb. The default stores it on the scope as-is.
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb, scope: &mut Scope) {
        scope.add_breadcrumb(breadcrumb);
    }

    fn capture_event(&self, event: &Event, scope: &Scope) -> Option<EventId>;

    fn capture_message(&self, message: &str, scope: &Scope) -> Option<EventId> {
        self.capture_event(&Event::from_message(message), scope)
    }

    fn capture_exception(&self, err: &(dyn Error + 'static), scope: &Scope) -> Option<EventId> {
        self.capture_event(&Event::from_error(err), scope)
    }
}
