//! Command policy: intent classification and the tiered decision cascade.

pub mod decision;
pub mod engine;
pub mod handlers;
pub mod intent;
pub mod limits;
pub mod tiers;

pub use decision::{Decision, RiskLevel, Ruling, Tier};
pub use engine::{decide, PolicyEngine};
pub use intent::{classify, CommandIntent};
pub use tiers::{evaluate, Facts};
