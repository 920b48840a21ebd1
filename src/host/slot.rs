// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Patchable slot holding one host primitive
//!
//! Host code resolves the slot on every call, so swapping its contents is
//! the Rust equivalent of replacing a global function. A slot can be patched
//! by at most one owner at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of whoever patched a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchOwner(u64);

impl PatchOwner {
    /// Allocate a fresh owner token
    pub fn next() -> Self {
        PatchOwner(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

struct SlotState<T: ?Sized> {
    current: Arc<T>,
    owner: Option<PatchOwner>,
}

/// A swappable host primitive
pub struct Patchable<T: ?Sized> {
    name: &'static str,
    state: RwLock<SlotState<T>>,
}

impl<T: ?Sized> Patchable<T> {
    /// Create a slot holding the host's native primitive
    pub fn new(name: &'static str, native: Arc<T>) -> Self {
        Self {
            name,
            state: RwLock::new(SlotState {
                current: native,
                owner: None,
            }),
        }
    }

    /// Slot name, used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current primitive
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.state.read().current)
    }

    /// Whether the slot currently holds exactly `other`
    pub fn is(&self, other: &Arc<T>) -> bool {
        Arc::ptr_eq(&self.state.read().current, other)
    }

    /// Whether some owner has patched the slot
    pub fn is_patched(&self) -> bool {
        self.state.read().owner.is_some()
    }

    /// Install `replacement` on behalf of `owner`.
    ///
    /// Returns `false` and leaves the slot untouched when another owner
    /// already holds the patch.
    pub fn patch(&self, owner: PatchOwner, replacement: Arc<T>) -> bool {
        let mut state = self.state.write();
        match state.owner {
            Some(existing) if existing != owner => {
                tracing::warn!(slot = self.name, "slot already patched by another interceptor");
                false
            }
            _ => {
                state.current = replacement;
                state.owner = Some(owner);
                true
            }
        }
    }

    /// Put `original` back if `owner` holds the patch
    pub fn restore(&self, owner: PatchOwner, original: Arc<T>) -> bool {
        let mut state = self.state.write();
        if state.owner != Some(owner) {
            return false;
        }
        state.current = original;
        state.owner = None;
        true
    }
}
