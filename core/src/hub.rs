//! The layer stack and capture dispatch.
//!
//! A [`Hub`] is a stack of [`Layer`]s. The top layer is the active context:
//! every capture call goes to its client together with its scope. Pushing
//! copies the top scope and shares the top client, so a nested context can
//! add context or rebind its client without touching the layers below.
//!
//! Nothing here faults on misuse. Popping an empty stack, binding a client
//! with no layers, or capturing with no client bound are all silent no-ops.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use scopestack_types::{Breadcrumb, Event, EventId};

use crate::{Clienter, Scope};

/// One stack frame: a client shared with the frame below and a scope owned
/// by this frame alone.
pub struct Layer {
    client: Option<Arc<dyn Clienter>>,
    scope: Scope,
}

impl Layer {
    #[inline]
    #[must_use]
    pub fn client(&self) -> Option<&Arc<dyn Clienter>> {
        self.client.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("has_client", &self.client.is_some())
            .field("scope", &self.scope)
            .finish()
    }
}

/// Per-context reporting state.
///
/// Mutation takes `&mut self`, so a single hub is only ever driven by one
/// thread of control. Concurrent contexts each get their own hub, see
/// [`crate::with_current_hub`].
#[derive(Debug, Default)]
pub struct Hub {
    stack: Vec<Layer>,
    last_event_id: Option<EventId>,
}

impl Hub {
    /// A hub seeded with one layer.
    #[must_use]
    pub fn new(client: Option<Arc<dyn Clienter>>, scope: Scope) -> Self {
        Self {
            stack: vec![Layer { client, scope }],
            last_event_id: None,
        }
    }

    /// A hub with no layers. Every call on it is a no-op until a layer is pushed.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            stack: Vec::new(),
            last_event_id: None,
        }
    }

    /// Forks a single-layer hub from the top of `other`: same client, copied scope.
    #[must_use]
    pub fn new_from_top(other: &Hub) -> Self {
        match other.stack_top() {
            Some(top) => Self::new(top.client.clone(), top.scope.clone()),
            None => Self::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.stack
    }

    #[inline]
    pub(crate) fn stack_top(&self) -> Option<&Layer> {
        self.stack.last()
    }

    #[must_use]
    pub fn scope(&self) -> Option<&Scope> {
        self.stack_top().map(|layer| &layer.scope)
    }

    pub fn scope_mut(&mut self) -> Option<&mut Scope> {
        self.stack.last_mut().map(|layer| &mut layer.scope)
    }

    #[must_use]
    pub fn client(&self) -> Option<&Arc<dyn Clienter>> {
        self.stack_top().and_then(|layer| layer.client.as_ref())
    }

    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.last_event_id
    }

    #[cfg(test)]
    pub(crate) fn set_last_event_id(&mut self, id: Option<EventId>) {
        self.last_event_id = id;
    }

    /// Pushes a layer sharing the top client and holding a copy of the top scope.
    ///
    /// On an empty hub the new layer has a fresh scope and no client.
    pub fn push_scope(&mut self) {
        self.push_layer();
    }

    fn push_layer(&mut self) -> &mut Scope {
        let layer = match self.stack_top() {
            Some(top) => Layer {
                client: top.client.clone(),
                scope: top.scope.clone(),
            },
            None => {
                tracing::trace!("Pushing onto an empty hub; new layer has no client");
                Layer {
                    client: None,
                    scope: Scope::new(),
                }
            }
        };
        let index = self.stack.len();
        self.stack.push(layer);
        tracing::trace!(depth = index + 1, "Pushed scope");
        &mut self.stack[index].scope
    }

    /// Removes the top layer. Does nothing on an empty hub.
    pub fn pop_scope(&mut self) {
        if self.stack.pop().is_some() {
            tracing::trace!(depth = self.stack.len(), "Popped scope");
        } else {
            tracing::trace!("Pop on an empty hub ignored");
        }
    }

    /// Replaces the client of the top layer only.
    pub fn bind_client(&mut self, client: Option<Arc<dyn Clienter>>) {
        let depth = self.stack.len();
        match self.stack.last_mut() {
            Some(top) => {
                tracing::trace!(depth, bound = client.is_some(), "Bound client");
                top.client = client;
            }
            None => tracing::trace!("Bind on an empty hub ignored"),
        }
    }

    /// Runs `f` against a freshly pushed copy of the top scope, then pops it.
    ///
    /// The pop also happens when `f` unwinds.
    pub fn with_scope<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Scope) -> R,
    {
        let mut guard = DepthGuard::new(self);
        let scope = guard.hub.push_layer();
        f(scope)
    }

    /// Like [`with_scope`](Self::with_scope) but hands `f` the whole hub, so the
    /// nested context can rebind its client or push further layers.
    ///
    /// On exit, normal or unwinding, the stack is cut back to the depth it had
    /// before the call. Layers `f` popped from below that depth stay popped.
    pub fn isolated<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Hub) -> R,
    {
        let mut guard = DepthGuard::new(self);
        guard.hub.push_layer();
        f(&mut *guard.hub)
    }

    /// Runs `f` against the current top scope. Changes persist; no layer is pushed.
    ///
    /// `f` is not called on an empty hub.
    pub fn configure_scope<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Scope),
    {
        match self.scope_mut() {
            Some(scope) => f(scope),
            None => tracing::trace!("Configure on an empty hub ignored"),
        }
    }

    /// Calls `callback` with the top client and scope, or drops the call when
    /// either is missing.
    pub(crate) fn invoke_client<F, R>(&mut self, callback: F) -> Option<R>
    where
        F: FnOnce(&dyn Clienter, &mut Scope) -> R,
    {
        let Some(layer) = self.stack.last_mut() else {
            tracing::trace!("No layer on hub; dropping client call");
            return None;
        };
        let Some(client) = layer.client.as_deref() else {
            tracing::trace!("No client bound; dropping client call");
            return None;
        };
        Some(callback(client, &mut layer.scope))
    }

    pub fn capture_event(&mut self, event: &Event) {
        let id = self.invoke_client(|client, scope| client.capture_event(event, scope));
        self.record_event_id(id);
    }

    pub fn capture_message(&mut self, message: &str) {
        let id = self.invoke_client(|client, scope| client.capture_message(message, scope));
        self.record_event_id(id);
    }

    pub fn capture_exception(&mut self, err: &(dyn Error + 'static)) {
        let id = self.invoke_client(|client, scope| client.capture_exception(err, scope));
        self.record_event_id(id);
    }

    pub fn add_breadcrumb(&mut self, breadcrumb: Breadcrumb) {
        self.invoke_client(|client, scope| client.add_breadcrumb(breadcrumb, scope));
    }

    fn record_event_id(&mut self, id: Option<Option<EventId>>) {
        if let Some(id) = id.flatten() {
            self.last_event_id = Some(id);
        }
    }
}

/// Cuts the stack back to its depth at construction when dropped.
struct DepthGuard<'a> {
    hub: &'a mut Hub,
    depth: usize,
}

impl<'a> DepthGuard<'a> {
    fn new(hub: &'a mut Hub) -> Self {
        let depth = hub.stack.len();
        Self { hub, depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        if self.hub.stack.len() > self.depth {
            self.hub.stack.truncate(self.depth);
            tracing::trace!(depth = self.depth, "Restored scope depth");
        }
    }
}
