//! # Client State Structures
//!
//! Shared state held by the console between operator actions: the session
//! value object, the last fetched airdrop snapshot, and the transient
//! loading indicator with its scoped reset guard.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Server-owned lifecycle phase of an airdrop event. The client never
/// computes transitions itself; it only reflects what the server reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirdropPhase {
    Open,
    Drawing,
    Closed,
}

impl AirdropPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AirdropPhase::Open => "Open",
            AirdropPhase::Drawing => "Drawing",
            AirdropPhase::Closed => "Closed",
        }
    }
}

/// A prize assigned to a winning address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WonPrize {
    pub amount: u64,
    pub symbol: String,
}

/// The most recently fetched snapshot of an airdrop event. Replaced
/// wholesale on every status check; never merged incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropStatus {
    pub status: AirdropPhase,
    pub winners: BTreeMap<String, WonPrize>,
}

/// Explicit record of an established session. The real credential is a
/// cookie held by the transport layer and opaque to the application;
/// authorization branches are driven by response status, never by
/// inspecting this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub wallet_address: Address,
    pub signed_at: u64,
}

/// Transient UI-facing progress indicator. Reset to idle after every
/// operation regardless of outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub message: String,
}

impl LoadingState {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Scoped acquisition of the loading flag. Dropping the guard resets the
/// state to idle, so every exit path of an operation clears the
/// indicator, success or failure.
pub struct LoadingGuard {
    slot: Arc<RwLock<LoadingState>>,
}

impl LoadingGuard {
    pub fn begin(slot: Arc<RwLock<LoadingState>>, message: &str) -> Self {
        tracing::debug!("{}", message);
        *slot.write() = LoadingState {
            is_loading: true,
            message: message.to_string(),
        };
        Self { slot }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        *self.slot.write() = LoadingState::idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_guard_resets_on_drop() {
        let slot = Arc::new(RwLock::new(LoadingState::idle()));
        {
            let _guard = LoadingGuard::begin(slot.clone(), "Drawing one prize...");
            let state = slot.read().clone();
            assert!(state.is_loading);
            assert_eq!(state.message, "Drawing one prize...");
        }
        assert_eq!(*slot.read(), LoadingState::idle());
    }

    #[test]
    fn loading_guard_resets_on_early_exit() {
        let slot = Arc::new(RwLock::new(LoadingState::idle()));
        let run = || -> Result<(), ()> {
            let _guard = LoadingGuard::begin(slot.clone(), "Creating airdrop event...");
            Err(())
        };
        assert!(run().is_err());
        assert!(!slot.read().is_loading);
    }
}
