//! Decision Log Sink: append-only persistence of synthesized states and decisions.
//!
//! A failed write is reported to the caller as `AuditError`; it is the caller's
//! job to decide that a failed write does not change the answer.

pub mod memory;
pub mod rest;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::vehicle::types::VehicleState;

pub use memory::MemoryLog;
pub use rest::RestSink;

pub const STATE_TABLE: &str = "vehicle_states";
pub const DECISION_TABLE: &str = "agent_decisions";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log is full ({capacity} records)")]
    Full { capacity: usize },
    #[error("audit request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("audit sink answered {status} for table {table}")]
    Rejected { table: &'static str, status: u16 },
}

/// Persisted copy of a synthesized state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub state: VehicleState,
}

impl StateRecord {
    pub fn new(state: VehicleState) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state,
        }
    }
}

/// One served decision. `user_input` is the only place raw command text is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_input: String,
    pub agent_response: String,
    pub vehicle_state_id: Option<String>,
    pub response_time_ms: u64,
}

impl DecisionRecord {
    pub fn new(
        user_input: impl Into<String>,
        agent_response: impl Into<String>,
        vehicle_state_id: Option<String>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_input: user_input.into(),
            agent_response: agent_response.into(),
            vehicle_state_id,
            response_time_ms,
        }
    }
}

pub enum AuditBackend {
    Memory(MemoryLog),
    Rest(RestSink),
}

impl AuditBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditBackend::Memory(_) => "memory",
            AuditBackend::Rest(_) => "rest",
        }
    }

    /// Returns the id the record was stored under.
    pub async fn append_state(&self, record: StateRecord) -> Result<Uuid, AuditError> {
        match self {
            AuditBackend::Memory(log) => log.push_state(record).await,
            AuditBackend::Rest(sink) => {
                let id = record.id;
                sink.insert(STATE_TABLE, &record).await?;
                Ok(id)
            }
        }
    }

    pub async fn append_decision(&self, record: DecisionRecord) -> Result<Uuid, AuditError> {
        match self {
            AuditBackend::Memory(log) => log.push_decision(record).await,
            AuditBackend::Rest(sink) => {
                let id = record.id;
                sink.insert(DECISION_TABLE, &record).await?;
                Ok(id)
            }
        }
    }
}
