// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-core: shared data model and clock abstraction for the Pulse daemon.

pub mod macros;

pub mod clock;
pub mod decision;
pub mod drive;
pub mod event;
pub mod feedback;
pub mod mutation;
pub mod sensor;

pub use clock::{Clock, FakeClock, SystemClock};
pub use decision::TriggerDecision;
pub use drive::{Drive, DriveState};
pub use event::{BroadcastEvent, InternalEventKind};
pub use feedback::{DriveDecayResult, FeedbackMessage, FeedbackOutcome};
pub use mutation::{MutationCommand, MutationOutcome, MutationRecord};
pub use sensor::{
    error_payload, ConversationReading, FileChange, FileChangeKind, FilesystemReading, SensorData, SystemAlert,
    SystemReading,
};
