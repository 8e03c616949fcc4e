use tracing::debug;

use crate::vehicle::types::{ValidationError, VehicleContext};

use super::decision::Decision;
use super::tiers::{evaluate, Facts};

/// Stateless entry point of the policy cascade. Cheap to share across requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decide on `command` against a context the caller has already validated.
    pub fn decide(&self, command: &str, ctx: &VehicleContext) -> Decision {
        let facts = Facts::new(command, ctx);
        let (tier, ruling) = evaluate(&facts);
        // Command text stays out of the log.
        debug!(
            tier = %tier,
            intent = %facts.intent,
            allowed = ruling.allowed,
            risk = ?ruling.risk,
            "policy decision"
        );
        ruling.into_decision(tier, facts.intent)
    }

    /// Validate first, then decide. Rejects what the cascade would otherwise
    /// silently push down to the idle tier.
    pub fn decide_checked(
        &self,
        command: &str,
        ctx: &VehicleContext,
    ) -> Result<Decision, ValidationError> {
        if command.trim().is_empty() {
            return Err(ValidationError::missing("user_input"));
        }
        ctx.validate()?;
        Ok(self.decide(command, ctx))
    }
}

/// Shorthand for `PolicyEngine::new().decide(..)`.
pub fn decide(command: &str, ctx: &VehicleContext) -> Decision {
    PolicyEngine::new().decide(command, ctx)
}
