//! Service telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side channel. The policy engine never reads it.
//!
//! # PRIVACY INVARIANT
//! Events never carry user content (command text, response text, locations).
//! Only enums, flags, counts and durations are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{AuditTable, Route, TelemetryEvent};
pub use metrics::{compute_snapshot, TelemetrySnapshot};
pub use recorder::TelemetryRecorder;
