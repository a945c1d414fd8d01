//! Shared test doubles.

#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};

use scopestack_core::{Clienter, Hub, Scope};
use scopestack_types::{Breadcrumb, Event, EventId};

/// A captured call together with the scope it was dispatched with.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub message: Option<String>,
    pub scope: Scope,
    pub event_id: EventId,
}

/// Records every call and hands out a fresh event id per capture.
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Recorded>>,
}

impl RecordingClient {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, message: Option<String>, scope: &Scope) -> EventId {
        let event_id = EventId::new();
        self.calls.lock().unwrap().push(Recorded {
            method,
            message,
            scope: scope.clone(),
            event_id,
        });
        event_id
    }
}

impl Clienter for RecordingClient {
    fn add_breadcrumb(&self, breadcrumb: Breadcrumb, scope: &mut Scope) {
        self.record("add_breadcrumb", breadcrumb.message.clone(), scope);
        scope.add_breadcrumb(breadcrumb);
    }

    fn capture_event(&self, event: &Event, scope: &Scope) -> Option<EventId> {
        Some(self.record("capture_event", event.message.clone(), scope))
    }

    fn capture_message(&self, message: &str, scope: &Scope) -> Option<EventId> {
        Some(self.record("capture_message", Some(message.to_string()), scope))
    }

    fn capture_exception(&self, err: &(dyn Error + 'static), scope: &Scope) -> Option<EventId> {
        Some(self.record("capture_exception", Some(err.to_string()), scope))
    }
}

pub fn hub_with(client: &Arc<RecordingClient>) -> Hub {
    let client: Arc<dyn Clienter> = client.clone();
    Hub::new(Some(client), Scope::new())
}
