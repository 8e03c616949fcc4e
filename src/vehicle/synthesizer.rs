use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::derived::compute_ar_opacity;
use super::scenario::{ScenarioTemplate, SCENARIOS};
use super::types::{StatePatch, ValidationError, VehicleState};

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("scenario weights are unusable: {0}")]
    Weights(#[from] WeightedError),
    #[error("scenario weights sum to {0}, expected 1.0")]
    WeightSum(f64),
    #[error("override rejected: {0}")]
    Override(#[from] ValidationError),
}

/// Weighted scenario sampler. Holds no RNG of its own; callers pass one per call.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    scenarios: &'static [ScenarioTemplate],
    index: WeightedIndex<f64>,
}

impl Synthesizer {
    pub fn new() -> Result<Self, SynthesisError> {
        Self::with_scenarios(SCENARIOS)
    }

    pub fn with_scenarios(scenarios: &'static [ScenarioTemplate]) -> Result<Self, SynthesisError> {
        let total: f64 = scenarios.iter().map(|s| s.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SynthesisError::WeightSum(total));
        }
        let index = WeightedIndex::new(scenarios.iter().map(|s| s.weight))?;
        Ok(Self { scenarios, index })
    }

    pub fn scenarios(&self) -> &'static [ScenarioTemplate] {
        self.scenarios
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static ScenarioTemplate {
        &self.scenarios[self.index.sample(rng)]
    }

    /// Fresh state from a weighted scenario draw, derived fields included.
    pub fn synthesize<R: Rng + ?Sized>(&self, rng: &mut R) -> VehicleState {
        let scenario = self.pick(rng);
        let state = scenario.realize(rng);
        debug!(
            scenario = ?scenario.kind,
            label = scenario.label,
            safety_level = state.safety_level,
            "synthesized vehicle state"
        );
        state
    }

    /// Override path: shallow-merge `patch` over `base`.
    ///
    /// `safety_level` is taken as given (operators pre-set it for triggered scenarios);
    /// only `ar_opacity` is re-derived.
    pub fn synthesize_from(
        &self,
        base: &VehicleState,
        patch: &StatePatch,
    ) -> Result<VehicleState, SynthesisError> {
        Ok(apply_override(base, patch)?)
    }

    /// Override path without a base record: the patch is the caller's prior state
    /// and must carry every core reading. Nothing is drawn at random, so optional
    /// readings the patch leaves out stay unknown.
    pub fn synthesize_standalone(
        &self,
        patch: &StatePatch,
    ) -> Result<VehicleState, SynthesisError> {
        let base = patch.to_state()?;
        self.synthesize_from(&base, patch)
    }
}

pub fn apply_override(base: &VehicleState, patch: &StatePatch) -> Result<VehicleState, ValidationError> {
    let mut next = patch.apply_to(base);
    next.validate()?;
    next.ar_opacity = compute_ar_opacity(next.safety_level, next.distraction_level);
    Ok(next)
}
