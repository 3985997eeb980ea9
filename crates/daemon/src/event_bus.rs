// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event bus: the daemon's [`pulse_engine::EventSink`]
//! implementation. Mirrors `original_source`'s `EventBus`, which lets
//! `TRIGGER_SUCCESS`/`TRIGGER_FAILURE`/`MUTATION_APPLIED` fan out to
//! subscribers without the Dispatcher or Mutator depending on them
//! directly. The built-in subscriber writes a
//! [`pulse_core::BroadcastEvent`] note for each so `/status` and the
//! Broadcast Bus stay in sync with what actually happened; `on` is the
//! attachment point for anything else that wants to react, though nothing
//! ships registered by default.

use std::collections::HashMap;

use parking_lot::Mutex;
use pulse_core::{Clock, InternalEventKind};
use pulse_engine::EventSink;
use pulse_storage::BroadcastBus;
use tracing::warn;

type Callback = Box<dyn Fn() + Send + Sync>;

pub struct EventBus<C: Clock> {
    bus: BroadcastBus,
    clock: C,
    subscribers: Mutex<HashMap<InternalEventKind, Vec<Callback>>>,
}

impl<C: Clock> EventBus<C> {
    pub fn new(bus: BroadcastBus, clock: C) -> Self {
        Self { bus, clock, subscribers: Mutex::new(HashMap::new()) }
    }

    /// Register a callback invoked after `emit`'s built-in broadcast write.
    pub fn on(&self, kind: InternalEventKind, callback: impl Fn() + Send + Sync + 'static) {
        self.subscribers.lock().entry(kind).or_default().push(Box::new(callback));
    }
}

impl<C: Clock> EventSink for EventBus<C> {
    fn emit(&self, kind: InternalEventKind) {
        let event = pulse_core::BroadcastEvent::new(self.clock.epoch_secs(), "daemon", kind.to_string(), 0.3);
        if let Err(err) = self.bus.append(&event) {
            warn!(error = %err, kind = %kind, "failed to append internal event to broadcast bus");
        }
        if let Some(callbacks) = self.subscribers.lock().get(&kind) {
            for callback in callbacks {
                callback();
            }
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
