//! Seeding a hub's root scope from a config file.

use std::io::Write;

use tempfile::NamedTempFile;

use scopestack_config::ScopeConfig;
use scopestack_core::{Hub, Scope};
use scopestack_types::Breadcrumb;

use crate::common::{RecordingClient, hub_with};

#[test]
fn config_file_seeds_root_scope_and_breadcrumb_limit() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
max_breadcrumbs = 2
environment = "production"

[tags]
region = "eu"

[user]
username = "ops"
"#
    )
    .unwrap();

    let config = ScopeConfig::load(file.path()).unwrap();
    let client = RecordingClient::shared();
    let mut hub = hub_with(&client);
    hub.configure_scope(|scope| *scope = Scope::from_config(&config));

    for i in 0..3 {
        hub.add_breadcrumb(Breadcrumb::new(format!("step {i}")));
    }
    hub.capture_message("done");

    let calls = client.calls();
    let capture = calls.last().unwrap();
    assert_eq!(capture.scope.tags()["environment"], "production");
    assert_eq!(capture.scope.tags()["region"], "eu");
    assert_eq!(
        capture.scope.user().and_then(|u| u.username.as_deref()),
        Some("ops")
    );
    let crumbs: Vec<_> = capture
        .scope
        .breadcrumbs()
        .iter()
        .filter_map(|b| b.message.as_deref())
        .collect();
    assert_eq!(crumbs, ["step 1", "step 2"]);
}

#[test]
fn clientless_hub_from_config_drops_captures() {
    let config = ScopeConfig::from_toml_str("release = \"2.0\"").unwrap();
    let mut hub = Hub::new(None, Scope::from_config(&config));

    hub.capture_message("nobody listening");

    assert_eq!(hub.last_event_id(), None);
    assert_eq!(hub.scope().unwrap().tags()["release"], "2.0");
}
