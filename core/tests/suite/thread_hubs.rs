//! Per-thread hubs forked from the process hub.
//!
//! This is the only test binary module that touches the process hub.

use std::sync::Arc;
use std::thread;

use scopestack_core::{
    Clienter, Hub, Scope, capture_message, configure_scope, last_event_id, set_process_hub,
    with_current_hub, with_scope,
};

use crate::common::RecordingClient;

#[test]
fn thread_hubs_fork_process_hub_and_stay_independent() {
    let client = RecordingClient::shared();
    let mut root_scope = Scope::new();
    root_scope.set_tag("service", "checkout");
    let shared: Arc<dyn Clienter> = client.clone();
    set_process_hub(Hub::new(Some(shared), root_scope));

    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|name| {
            thread::spawn(move || {
                configure_scope(|scope| scope.set_tag("worker", name));
                let nested = with_scope(|scope| scope.set_tag("nested", "yes"));
                assert_eq!(nested, Some(()));
                capture_message(name);
                let id = last_event_id();
                assert!(id.is_some());
                with_current_hub(|hub| hub.depth())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(1));
    }

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        let tags = call.scope.tags();
        assert_eq!(tags["service"], "checkout");
        assert_eq!(Some(&tags["worker"]), call.message.as_ref());
        assert!(!tags.contains_key("nested"));
    }
}
