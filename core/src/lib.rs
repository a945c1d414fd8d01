//! Contextual scope stack for event reporting.
//!
//! A [`Hub`] holds a stack of layers, each pairing a [`Clienter`] with a
//! [`Scope`]. Capture calls go to the client of the top layer along with its
//! scope. [`Hub::with_scope`] and [`Hub::isolated`] branch the context for
//! the duration of a closure, [`Hub::configure_scope`] edits it in place.
//!
//! The `current` functions locate a per-thread hub for code that has no hub
//! handed to it.

mod client;
mod current;
mod hub;
mod scope;
mod tracing_client;

pub use client::Clienter;
pub use current::{
    add_breadcrumb, capture_event, capture_exception, capture_message, configure_scope,
    last_event_id, run_with_hub, set_process_hub, with_current_hub, with_scope,
};
pub use hub::{Hub, Layer};
pub use scope::Scope;
pub use tracing_client::{BeforeBreadcrumb, TracingClient};

pub use scopestack_types::{DEFAULT_MAX_BREADCRUMBS, MAX_BREADCRUMBS};
