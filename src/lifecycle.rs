//! Load and submit bookkeeping shared by the views.

use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

/// Message shown in a view's status banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    /// The server rejected what was submitted.
    Validation(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::Error(message) => message,
        }
    }
}

/// Most notices a view keeps; older ones are dropped first.
pub const MAX_NOTICES: usize = 8;

/// Records `notice` unless an identical one is already pending.
pub fn push_notice(notices: &mut Vec<Notice>, notice: Notice) {
    if notices.contains(&notice) {
        return;
    }
    if notices.len() >= MAX_NOTICES {
        notices.remove(0);
    }
    notices.push(notice);
}

/// Handed to a running load; goes dead once the load is superseded or the
/// view is deactivated. Once `revoke` returns, no write made through
/// [`LoadTicket::write_if_live`] can still land.
#[derive(Debug, Clone)]
pub struct LoadTicket(Arc<RwLock<bool>>);

impl LoadTicket {
    fn new() -> Self {
        Self(Arc::new(RwLock::new(true)))
    }

    pub fn is_live(&self) -> bool {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `write` only while the ticket is live, holding revocation off
    /// until it finishes.
    pub fn write_if_live<R>(&self, write: impl FnOnce() -> R) -> Option<R> {
        let live = self.0.read().unwrap_or_else(PoisonError::into_inner);
        (*live).then(write)
    }

    fn revoke(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

struct Running {
    ticket: LoadTicket,
    abort: AbortHandle,
}

/// Runs at most one load per view at a time.
pub struct ViewLoader {
    view: &'static str,
    running: Mutex<Option<Running>>,
}

impl ViewLoader {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            running: Mutex::new(None),
        }
    }

    /// Spawns `load`, aborting whichever load was still running.
    pub fn start<F, Fut>(&self, load: F) -> JoinHandle<()>
    where
        F: FnOnce(LoadTicket) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = LoadTicket::new();
        let handle = tokio::spawn(load(ticket.clone()));
        let previous = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Running {
                ticket,
                abort: handle.abort_handle(),
            });
        if let Some(previous) = previous {
            debug!("{} view: superseding in-flight load", self.view);
            previous.ticket.revoke();
            previous.abort.abort();
        }
        handle
    }

    pub fn cancel(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(running) = running {
            if !running.abort.is_finished() {
                debug!("{} view: cancelling in-flight load", self.view);
            }
            running.ticket.revoke();
            running.abort.abort();
        }
    }
}

/// Refuses a second submission while one is outstanding.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
