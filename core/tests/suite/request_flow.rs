//! End-to-end flows through explicit hubs.

use std::io;
use std::sync::Arc;
use std::thread;

use serde_json::json;

use scopestack_core::{Clienter, Hub};
use scopestack_types::{Breadcrumb, Event};

use crate::common::{RecordingClient, hub_with};

#[test]
fn pushed_extra_stays_on_its_layer() {
    let client = RecordingClient::shared();
    let mut hub = hub_with(&client);
    hub.configure_scope(|scope| scope.set_extra("foo", "bar"));

    hub.push_scope();
    hub.configure_scope(|scope| scope.set_extra("baz", "qux"));

    let extras: Vec<_> = hub
        .layers()
        .iter()
        .map(|layer| serde_json::to_value(layer.scope().extra()).unwrap())
        .collect();
    assert_eq!(
        extras,
        vec![
            json!({ "foo": "bar" }),
            json!({ "foo": "bar", "baz": "qux" }),
        ]
    );

    hub.pop_scope();
    assert_eq!(hub.depth(), 1);
    assert_eq!(
        serde_json::to_value(hub.scope().unwrap().extra()).unwrap(),
        json!({ "foo": "bar" })
    );
}

#[test]
fn nested_handler_rebinds_client_for_its_own_captures() {
    let outer_client = RecordingClient::shared();
    let audit_client = RecordingClient::shared();
    let mut hub = hub_with(&outer_client);

    hub.capture_message("before");
    hub.isolated(|hub| {
        let audit: Arc<dyn Clienter> = audit_client.clone();
        hub.bind_client(Some(audit));
        hub.configure_scope(|scope| scope.set_tag("audit", "true"));
        hub.capture_message("audited");
    });
    hub.capture_message("after");

    let outer: Vec<_> = outer_client
        .calls()
        .into_iter()
        .filter_map(|call| call.message)
        .collect();
    assert_eq!(outer, ["before", "after"]);

    let audited = audit_client.calls();
    assert_eq!(audited.len(), 1);
    assert_eq!(audited[0].scope.tags()["audit"], "true");
    assert!(hub.scope().unwrap().tags().is_empty());
}

#[test]
fn last_event_id_tracks_most_recent_capture() {
    let client = RecordingClient::shared();
    let mut hub = hub_with(&client);

    hub.capture_event(&Event::from_message("first"));
    hub.capture_exception(&io::Error::other("second"));
    hub.add_breadcrumb(Breadcrumb::new("not an event"));

    let calls = client.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].method, "capture_exception");
    assert_eq!(hub.last_event_id(), Some(calls[1].event_id));
}

#[test]
fn breadcrumbs_recorded_in_child_are_not_seen_by_parent_events() {
    let client = RecordingClient::shared();
    let mut hub = hub_with(&client);
    hub.add_breadcrumb(Breadcrumb::new("root crumb"));

    hub.with_scope(|scope| scope.add_breadcrumb(Breadcrumb::new("child crumb")));
    hub.capture_message("from root");

    let calls = client.calls();
    let capture = calls.last().unwrap();
    assert_eq!(capture.method, "capture_message");
    assert_eq!(capture.scope.breadcrumbs().len(), 1);
    assert_eq!(
        capture.scope.breadcrumbs()[0].message.as_deref(),
        Some("root crumb")
    );
}

#[test]
fn per_request_hubs_do_not_share_scope_state() {
    let client = RecordingClient::shared();
    let root = hub_with(&client);

    let handles: Vec<_> = (0..8)
        .map(|request| {
            let mut hub = Hub::new_from_top(&root);
            thread::spawn(move || {
                hub.configure_scope(|scope| scope.set_tag("request", request.to_string()));
                hub.with_scope(|scope| scope.set_tag("transient", "x"));
                hub.capture_message(&format!("request {request}"));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let calls = client.calls();
    assert_eq!(calls.len(), 8);
    for call in calls {
        let message = call.message.unwrap();
        let request = &call.scope.tags()["request"];
        assert_eq!(message, format!("request {request}"));
        assert!(!call.scope.tags().contains_key("transient"));
    }
    assert!(root.scope().unwrap().tags().is_empty());
}
