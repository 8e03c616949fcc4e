use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded event window; the oldest event is dropped once full.
#[derive(Debug)]
pub struct TelemetryRecorder {
    capacity: usize,
    buffer: VecDeque<TelemetryEvent>,
    dropped: u64,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            dropped: 0,
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
            self.dropped += 1;
        }
        self.buffer.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let mut snap = compute_snapshot(&self.buffer);
        snap.dropped_events = self.dropped;
        snap
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CommandIntent, Tier};
    use crate::telemetry::event::{AuditTable, Route};

    fn served(tier: Tier, allowed: bool, latency_us: u64) -> TelemetryEvent {
        TelemetryEvent::DecisionServed {
            tier,
            intent: CommandIntent::Music,
            allowed,
            latency_us,
        }
    }

    #[test]
    fn snapshot_counts_and_averages() {
        let mut rec = TelemetryRecorder::new();
        rec.record(served(Tier::Parked, true, 1_000));
        rec.record(served(Tier::Driving, false, 3_000));
        rec.record(TelemetryEvent::AuditWriteFailed {
            table: AuditTable::Decisions,
        });
        rec.record(TelemetryEvent::RequestRejected {
            route: Route::Decide,
        });

        let snap = rec.snapshot();
        assert_eq!(snap.decisions.total, 2);
        assert_eq!(snap.decisions.allowed, 1);
        assert_eq!(snap.decisions.denied, 1);
        assert_eq!(snap.decisions.per_tier.get(&Tier::Driving), Some(&1));
        assert!((snap.decisions.avg_response_ms - 2.0).abs() < 1e-9);
        assert!((snap.decisions.max_response_ms - 3.0).abs() < 1e-9);
        assert_eq!(snap.audit.decision_write_failures, 1);
        assert_eq!(snap.rejected_requests, 1);
    }

    #[test]
    fn window_is_bounded() {
        let mut rec = TelemetryRecorder::with_capacity(2);
        for _ in 0..5 {
            rec.record(served(Tier::Idle, true, 10));
        }
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.snapshot().dropped_events, 3);
    }
}
