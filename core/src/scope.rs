//! Mutable diagnostic context attached to captured events.

use std::collections::{BTreeMap, VecDeque};

use serde_json::Value;

use scopestack_config::ScopeConfig;
use scopestack_types::{
    Breadcrumb, DEFAULT_MAX_BREADCRUMBS, Event, Level, MAX_BREADCRUMBS, User,
};

/// Tags, extras, breadcrumbs and identity that get merged into every event
/// captured while this scope is on top of a hub.
///
/// `Clone` is a deep copy: every map and the breadcrumb ring get their own
/// storage, which is what keeps a pushed layer from leaking into its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    tags: BTreeMap<String, String>,
    extra: BTreeMap<String, Value>,
    breadcrumbs: VecDeque<Breadcrumb>,
    max_breadcrumbs: usize,
    user: Option<User>,
    fingerprint: Option<Vec<String>>,
    level: Option<Level>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            tags: BTreeMap::new(),
            extra: BTreeMap::new(),
            breadcrumbs: VecDeque::new(),
            max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
            user: None,
            fingerprint: None,
            level: None,
        }
    }
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a root scope from configuration.
    ///
    /// `environment` and `release` become tags of the same name.
    #[must_use]
    pub fn from_config(config: &ScopeConfig) -> Self {
        let mut scope = Self {
            tags: config.tags().clone(),
            extra: config.extra().clone(),
            max_breadcrumbs: config.max_breadcrumbs(),
            user: config.user().cloned(),
            ..Self::default()
        };
        if let Some(environment) = config.environment() {
            scope.set_tag("environment", environment);
        }
        if let Some(release) = config.release() {
            scope.set_tag("release", release);
        }
        scope
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn set_tags<I, K, V>(&mut self, tags: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn remove_tag(&mut self, key: &str) -> Option<String> {
        self.tags.remove(key)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    pub fn set_extras<I, K>(&mut self, extras: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.extra
            .extend(extras.into_iter().map(|(k, v)| (k.into(), v)));
    }

    pub fn remove_extra(&mut self, key: &str) -> Option<Value> {
        self.extra.remove(key)
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    pub fn set_fingerprint(&mut self, fingerprint: Option<Vec<String>>) {
        self.fingerprint = fingerprint;
    }

    pub fn set_level(&mut self, level: Option<Level>) {
        self.level = level;
    }

    /// Appends a breadcrumb, evicting the oldest ones once the limit is reached.
    ///
    /// A limit of zero disables breadcrumbs for this scope.
    pub fn add_breadcrumb(&mut self, breadcrumb: Breadcrumb) {
        if self.max_breadcrumbs == 0 {
            return;
        }
        while self.breadcrumbs.len() >= self.max_breadcrumbs {
            self.breadcrumbs.pop_front();
        }
        self.breadcrumbs.push_back(breadcrumb);
    }

    pub fn clear_breadcrumbs(&mut self) {
        self.breadcrumbs.clear();
    }

    /// Sets the breadcrumb limit, clamped to [`MAX_BREADCRUMBS`].
    pub fn set_max_breadcrumbs(&mut self, max: usize) {
        self.max_breadcrumbs = max.min(MAX_BREADCRUMBS);
        while self.breadcrumbs.len() > self.max_breadcrumbs {
            self.breadcrumbs.pop_front();
        }
    }

    /// Drops all context. The breadcrumb limit is kept.
    pub fn clear(&mut self) {
        *self = Self {
            max_breadcrumbs: self.max_breadcrumbs,
            ..Self::default()
        };
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    #[must_use]
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    #[must_use]
    pub fn breadcrumbs(&self) -> &VecDeque<Breadcrumb> {
        &self.breadcrumbs
    }

    #[must_use]
    pub fn max_breadcrumbs(&self) -> usize {
        self.max_breadcrumbs
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn fingerprint(&self) -> Option<&[String]> {
        self.fingerprint.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> Option<Level> {
        self.level
    }

    /// Merges this scope into `event`.
    ///
    /// Tags and extras only fill keys the event does not set itself. The user
    /// is applied when the event has none. Fingerprint and level on the scope
    /// override the event's. Breadcrumbs are attached only to events that
    /// carry none of their own.
    #[must_use]
    pub fn apply_to_event(&self, mut event: Event) -> Event {
        for (key, value) in &self.tags {
            event
                .tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        for (key, value) in &self.extra {
            event
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        if event.user.is_none() {
            event.user.clone_from(&self.user);
        }
        if let Some(fingerprint) = &self.fingerprint {
            event.fingerprint = Some(fingerprint.clone());
        }
        if let Some(level) = self.level {
            event.level = level;
        }
        if event.breadcrumbs.is_empty() {
            event.breadcrumbs = self.breadcrumbs.iter().cloned().collect();
        }
        event
    }
}
