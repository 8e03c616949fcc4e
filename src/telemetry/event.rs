use serde::{Deserialize, Serialize};

use crate::policy::{CommandIntent, Tier};
use crate::vehicle::ScenarioKind;

// Allowed: enums, flags, durations, counts.
// Forbidden: command text, responses, locations, weather strings.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    DecisionServed {
        tier: Tier,
        intent: CommandIntent,
        allowed: bool,
        latency_us: u64,
    },

    StateSynthesized {
        scenario: Option<ScenarioKind>,
        overridden: bool,
    },

    AuditWriteFailed {
        table: AuditTable,
    },

    RequestRejected {
        route: Route,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditTable {
    States,
    Decisions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Decide,
    SynthesizeState,
}
