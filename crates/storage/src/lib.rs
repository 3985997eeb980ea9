// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-storage: on-disk persistence for the Pulse daemon — the
//! append-only Broadcast Bus, the debounced atomic State Store, the
//! trigger-history and mutation audit logs, and the lock-guarded mutation
//! queue.

mod broadcast;
mod error;
mod mutation_log;
mod mutation_queue;
mod state_store;
mod trigger_history;

pub use broadcast::BroadcastBus;
pub use error::StorageError;
pub use mutation_log::MutationLog;
pub use mutation_queue::MutationQueue;
pub use state_store::StateStore;
pub use trigger_history::{TriggerHistoryEntry, TriggerHistoryLog};
