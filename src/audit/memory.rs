use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AuditError, DecisionRecord, StateRecord};

#[derive(Default)]
struct Tables {
    states: Vec<StateRecord>,
    decisions: Vec<DecisionRecord>,
}

impl Tables {
    fn len(&self) -> usize {
        self.states.len() + self.decisions.len()
    }
}

/// Append-only in-process log. Refuses writes once `capacity` records are held;
/// nothing is ever evicted.
pub struct MemoryLog {
    capacity: usize,
    tables: Mutex<Tables>,
}

impl MemoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tables: Mutex::new(Tables::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn push_state(&self, record: StateRecord) -> Result<Uuid, AuditError> {
        let mut tables = self.tables.lock().await;
        if tables.len() >= self.capacity {
            return Err(AuditError::Full {
                capacity: self.capacity,
            });
        }
        let id = record.id;
        tables.states.push(record);
        Ok(id)
    }

    pub async fn push_decision(&self, record: DecisionRecord) -> Result<Uuid, AuditError> {
        let mut tables = self.tables.lock().await;
        if tables.len() >= self.capacity {
            return Err(AuditError::Full {
                capacity: self.capacity,
            });
        }
        let id = record.id;
        tables.decisions.push(record);
        Ok(id)
    }

    pub async fn states(&self) -> Vec<StateRecord> {
        self.tables.lock().await.states.clone()
    }

    pub async fn decisions(&self) -> Vec<DecisionRecord> {
        self.tables.lock().await.decisions.clone()
    }

    pub async fn len(&self) -> usize {
        self.tables.lock().await.len()
    }
}
