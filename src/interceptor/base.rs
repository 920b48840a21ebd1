// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor lifecycle and handler registry

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::host::PatchOwner;

/// Common lifecycle of every interceptor
pub trait Interceptor: Send + Sync {
    /// Patch the host primitive. Idempotent.
    fn enable_interception(&self);

    /// Restore the captured original and clear all handlers. Idempotent.
    fn disable_interception(&self);

    fn is_interceptor_enabled(&self) -> bool;
}

/// State shared between an interceptor and the replacement it installs.
///
/// The replacement only ever reads through [`InterceptorState::emit`] and
/// [`InterceptorState::emit_in`], which check the live enabled flag, so
/// events of a disabled interceptor go nowhere.
pub(crate) struct InterceptorState<H> {
    name: &'static str,
    owner: PatchOwner,
    enabled: AtomicBool,
    /// Bumped on every enable; in-flight work started under an older
    /// session stays silent.
    session: AtomicU64,
    handlers: RwLock<H>,
    lifecycle: Mutex<()>,
}

impl<H: Default + Clone> InterceptorState<H> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            owner: PatchOwner::next(),
            enabled: AtomicBool::new(false),
            session: AtomicU64::new(0),
            handlers: RwLock::new(H::default()),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn owner(&self) -> PatchOwner {
        self.owner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Current enable session
    pub fn session(&self) -> u64 {
        self.session.load(Ordering::Acquire)
    }

    /// Mutate the handler registry
    pub fn update(&self, f: impl FnOnce(&mut H)) {
        f(&mut self.handlers.write());
    }

    /// Emit a synchronous event
    pub fn emit(&self, event: &'static str, f: impl FnOnce(&H)) {
        if !self.is_enabled() {
            tracing::trace!(interceptor = self.name, event, "dropped: interceptor disabled");
            return;
        }
        self.dispatch(event, f);
    }

    /// Emit an event belonging to work started in `session`
    pub fn emit_in(&self, session: u64, event: &'static str, f: impl FnOnce(&H)) {
        if !self.is_enabled() || self.session() != session {
            tracing::trace!(interceptor = self.name, event, "dropped: stale session");
            return;
        }
        self.dispatch(event, f);
    }

    fn dispatch(&self, event: &'static str, f: impl FnOnce(&H)) {
        // No lock is held while user code runs
        let handlers = self.handlers.read().clone();

        if catch_unwind(AssertUnwindSafe(|| f(&handlers))).is_err() {
            tracing::warn!(interceptor = self.name, event, "handler panicked; event lost");
        }
    }

    /// Enable using `patch`, which installs the replacement and reports
    /// whether the slot accepted it
    pub fn enable_with(&self, patch: impl FnOnce() -> bool) {
        let _guard = self.lifecycle.lock();
        if self.is_enabled() {
            return;
        }

        if !patch() {
            tracing::warn!(interceptor = self.name, "enable refused: host primitive already patched");
            return;
        }

        self.session.fetch_add(1, Ordering::AcqRel);
        self.enabled.store(true, Ordering::Release);
        tracing::info!(interceptor = self.name, "interception enabled");
    }

    /// Disable using `restore`, which puts the captured original back
    pub fn disable_with(&self, restore: impl FnOnce()) {
        let _guard = self.lifecycle.lock();
        if !self.is_enabled() {
            return;
        }

        self.enabled.store(false, Ordering::Release);
        restore();
        *self.handlers.write() = H::default();
        tracing::info!(interceptor = self.name, "interception disabled");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Default, Clone)]
    struct Handlers {
        ping: Option<Arc<dyn Fn(u32) + Send + Sync>>,
    }

    fn recording_state() -> (InterceptorState<Handlers>, Arc<Mutex<Vec<u32>>>) {
        let state = InterceptorState::<Handlers>::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state.update(|h| h.ping = Some(Arc::new(move |n| sink.lock().push(n))));
        (state, seen)
    }

    fn ping(state: &InterceptorState<Handlers>, n: u32) {
        state.emit("ping", |h| {
            if let Some(cb) = &h.ping {
                cb(n)
            }
        });
    }

    #[test]
    fn test_emit_requires_enabled() {
        let (state, seen) = recording_state();

        ping(&state, 1);
        state.enable_with(|| true);
        ping(&state, 2);

        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn test_lifecycle_is_idempotent() {
        let (state, _seen) = recording_state();
        let patches = Mutex::new(0);
        let restores = Mutex::new(0);

        state.disable_with(|| *restores.lock() += 1);
        state.enable_with(|| {
            *patches.lock() += 1;
            true
        });
        state.enable_with(|| {
            *patches.lock() += 1;
            true
        });
        state.disable_with(|| *restores.lock() += 1);
        state.disable_with(|| *restores.lock() += 1);

        assert_eq!(*patches.lock(), 1);
        assert_eq!(*restores.lock(), 1);
    }

    #[test]
    fn test_disable_clears_handlers() {
        let (state, seen) = recording_state();
        state.enable_with(|| true);
        state.disable_with(|| {});
        state.enable_with(|| true);

        ping(&state, 7);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_refused_patch_stays_disabled() {
        let (state, _seen) = recording_state();
        state.enable_with(|| false);
        assert!(!state.is_enabled());
    }

    #[test]
    fn test_stale_session_is_dropped() {
        let (state, seen) = recording_state();
        state.enable_with(|| true);
        let session = state.session();

        state.disable_with(|| {});
        let sink = Arc::clone(&seen);
        state.update(|h| h.ping = Some(Arc::new(move |n| sink.lock().push(n))));
        state.enable_with(|| true);

        state.emit_in(session, "ping", |h| {
            if let Some(cb) = &h.ping {
                cb(1)
            }
        });
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let state = InterceptorState::<Handlers>::new("test");
        state.update(|h| h.ping = Some(Arc::new(|_| panic!("handler bug"))));
        state.enable_with(|| true);

        ping(&state, 1);
        assert!(state.is_enabled());
    }
}
