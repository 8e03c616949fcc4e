use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use super::event::{AuditTable, TelemetryEvent};
use crate::policy::Tier;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub decisions: DecisionStats,
    pub synthesis: SynthesisStats,
    pub audit: AuditStats,
    pub rejected_requests: u64,
    /// Events pushed out of the bounded window since start.
    pub dropped_events: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionStats {
    pub total: u64,
    pub allowed: u64,
    pub denied: u64,
    pub per_tier: BTreeMap<Tier, u64>,
    pub avg_response_ms: f64,
    pub max_response_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SynthesisStats {
    pub total: u64,
    pub overridden: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditStats {
    pub state_write_failures: u64,
    pub decision_write_failures: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_latency_us: u64 = 0;
    let mut max_latency_us: u64 = 0;

    for event in events {
        match event {
            TelemetryEvent::DecisionServed {
                tier,
                allowed,
                latency_us,
                ..
            } => {
                snap.decisions.total += 1;
                if *allowed {
                    snap.decisions.allowed += 1;
                } else {
                    snap.decisions.denied += 1;
                }
                *snap.decisions.per_tier.entry(*tier).or_insert(0) += 1;
                total_latency_us += latency_us;
                max_latency_us = max_latency_us.max(*latency_us);
            }
            TelemetryEvent::StateSynthesized { overridden, .. } => {
                snap.synthesis.total += 1;
                if *overridden {
                    snap.synthesis.overridden += 1;
                }
            }
            TelemetryEvent::AuditWriteFailed { table } => match table {
                AuditTable::States => snap.audit.state_write_failures += 1,
                AuditTable::Decisions => snap.audit.decision_write_failures += 1,
            },
            TelemetryEvent::RequestRejected { .. } => snap.rejected_requests += 1,
        }
    }

    if snap.decisions.total > 0 {
        snap.decisions.avg_response_ms =
            total_latency_us as f64 / snap.decisions.total as f64 / 1000.0;
    }
    snap.decisions.max_response_ms = max_latency_us as f64 / 1000.0;

    snap
}
