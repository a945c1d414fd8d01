//! The event payload handed to clients.

use std::collections::BTreeMap;
use std::error::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Breadcrumb, EventId, Level, User};

/// One entry of an error chain, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl ExceptionInfo {
    #[must_use]
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        Self {
            kind: type_from_debug(&format!("{err:?}")),
            value: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exception: Vec<ExceptionInfo>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl Event {
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
            level: Level::Error,
            message: None,
            exception: Vec::new(),
            tags: BTreeMap::new(),
            extra: BTreeMap::new(),
            user: None,
            fingerprint: None,
            breadcrumbs: Vec::new(),
        }
    }

    /// An informational event carrying only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: Some(message.into()),
            ..Self::new()
        }
    }

    /// An error-level event with one exception entry per link of the `source()` chain.
    #[must_use]
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut exception = vec![ExceptionInfo::from_error(err)];
        let mut source = err.source();
        while let Some(inner) = source {
            exception.push(ExceptionInfo::from_error(inner));
            source = inner.source();
        }
        Self {
            message: Some(err.to_string()),
            exception,
            ..Self::new()
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort type name: the leading identifier path of the `Debug` output.
fn type_from_debug(debug: &str) -> String {
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}
