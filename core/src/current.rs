//! Locating "the" hub for the calling thread.
//!
//! Each thread owns one hub, created on first use by forking the top layer
//! of the process hub. After that the two evolve independently, so context
//! added on one thread never shows up on another. Until a process hub with
//! at least one layer is installed, no thread hub is stored.

use std::cell::RefCell;
use std::error::Error;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use scopestack_types::{Breadcrumb, Event, EventId};

use crate::{Hub, Scope};

static PROCESS_HUB: Mutex<Hub> = Mutex::new(Hub::empty());

thread_local! {
    static THREAD_HUB: RefCell<Option<Hub>> = const { RefCell::new(None) };
}

fn lock_process_hub() -> MutexGuard<'static, Hub> {
    PROCESS_HUB.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the process-wide hub that new thread hubs are forked from.
///
/// The calling thread's own hub is discarded so its next access forks the new
/// one. Other threads that already hold a hub keep it.
pub fn set_process_hub(hub: Hub) {
    let depth = hub.depth();
    *lock_process_hub() = hub;
    THREAD_HUB.with(|cell| {
        if let Ok(mut slot) = cell.try_borrow_mut() {
            slot.take();
        }
    });
    tracing::debug!(depth, "Installed process hub");
}

/// Runs `f` with the calling thread's hub.
///
/// Returns `None` without calling `f` when the thread hub is already in use
/// further up the call stack, e.g. a client reporting from inside a capture.
///
/// While the process hub has no layers, `f` gets a throwaway empty hub and
/// nothing is stored, so a later [`set_process_hub`] still reaches this thread.
pub fn with_current_hub<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Hub) -> R,
{
    THREAD_HUB.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            tracing::debug!("Thread hub is busy; dropping reentrant call");
            return None;
        };
        if slot.is_none() {
            let fork = Hub::new_from_top(&lock_process_hub());
            if fork.depth() == 0 {
                tracing::trace!("No process hub installed; using a transient hub");
                let mut transient = fork;
                return Some(f(&mut transient));
            }
            *slot = Some(fork);
        }
        slot.as_mut().map(f)
    })
}

/// Makes `hub` the calling thread's hub while `f` runs and hands it back afterwards.
///
/// The previous thread hub is restored on return and on unwinding. When the
/// thread hub is busy, `f` runs without the swap and `hub` comes back untouched.
pub fn run_with_hub<F, R>(hub: Hub, f: F) -> (R, Hub)
where
    F: FnOnce() -> R,
{
    let mut installed = match InstalledHub::install(hub) {
        Ok(installed) => installed,
        Err(hub) => {
            tracing::debug!("Thread hub is busy; running without swapping hubs");
            return (f(), hub);
        }
    };
    let result = f();
    let hub = installed.restore().unwrap_or_default();
    (result, hub)
}

struct InstalledHub {
    previous: Option<Option<Hub>>,
}

impl InstalledHub {
    fn install(hub: Hub) -> Result<Self, Hub> {
        THREAD_HUB.with(|cell| match cell.try_borrow_mut() {
            Ok(mut slot) => Ok(Self {
                previous: Some(slot.replace(hub)),
            }),
            Err(_) => Err(hub),
        })
    }

    /// Puts the previous hub back and returns the one that was installed.
    fn restore(&mut self) -> Option<Hub> {
        let previous = self.previous.take()?;
        THREAD_HUB.with(|cell| {
            let mut slot = cell.try_borrow_mut().ok()?;
            mem::replace(&mut *slot, previous)
        })
    }
}

impl Drop for InstalledHub {
    fn drop(&mut self) {
        if self.previous.is_some() {
            let _ = self.restore();
        }
    }
}

pub fn capture_event(event: &Event) {
    with_current_hub(|hub| hub.capture_event(event));
}

pub fn capture_message(message: &str) {
    with_current_hub(|hub| hub.capture_message(message));
}

pub fn capture_exception(err: &(dyn Error + 'static)) {
    with_current_hub(|hub| hub.capture_exception(err));
}

pub fn add_breadcrumb(breadcrumb: Breadcrumb) {
    with_current_hub(|hub| hub.add_breadcrumb(breadcrumb));
}

pub fn configure_scope<F>(f: F)
where
    F: FnOnce(&mut Scope),
{
    with_current_hub(|hub| hub.configure_scope(f));
}

pub fn with_scope<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Scope) -> R,
{
    with_current_hub(|hub| hub.with_scope(f))
}

#[must_use]
pub fn last_event_id() -> Option<EventId> {
    with_current_hub(|hub| hub.last_event_id()).flatten()
}
