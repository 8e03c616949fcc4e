//! Wire types for the HTTP surface and boundary validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::Decision;
use crate::vehicle::types::{Gear, StatePatch, ValidationError, VehicleContext, VehicleState};
use crate::vehicle::Preset;

/// Raw `POST /decide` body. Everything is optional on the wire so that a missing
/// field becomes a field-level 400 instead of a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecideRequest {
    pub user_input: Option<String>,
    pub gear: Option<String>,
    pub speed: Option<f64>,
    pub distraction_level: Option<f64>,
    pub safety_level: Option<i64>,
    pub battery_percentage: Option<f64>,
    pub cabin_temp: Option<f64>,
    pub weather: Option<String>,
    /// Informational only; the cascade reads the raw readings, not the label.
    pub scenario_type: Option<String>,
    pub aeb_triggered: Option<bool>,
    pub fatigue_level: Option<f64>,
    pub vehicle_state_id: Option<String>,
}

impl DecideRequest {
    /// Command text and a checked context, or the first offending field.
    pub fn validate(&self) -> Result<(String, VehicleContext), ValidationError> {
        let command = self
            .user_input
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ValidationError::missing("user_input"))?;

        let gear: Gear = self
            .gear
            .as_deref()
            .ok_or_else(|| ValidationError::missing("gear"))?
            .parse()?;
        let speed = self.speed.ok_or_else(|| ValidationError::missing("speed"))?;
        let distraction = self
            .distraction_level
            .ok_or_else(|| ValidationError::missing("distraction_level"))?;
        let safety = self
            .safety_level
            .ok_or_else(|| ValidationError::missing("safety_level"))?;
        let safety = u8::try_from(safety).map_err(|_| {
            ValidationError::new("safety_level", format!("{} is outside 1..=5", safety))
        })?;

        let ctx = VehicleContext {
            gear,
            speed,
            distraction_level: distraction,
            safety_level: safety,
            battery_percentage: self.battery_percentage,
            cabin_temp: self.cabin_temp,
            weather: self
                .weather
                .as_deref()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string),
            fatigue_level: self.fatigue_level,
            aeb_triggered: self.aeb_triggered.unwrap_or(false),
        };
        ctx.validate()?;
        Ok((command.to_string(), ctx))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecideResponse {
    #[serde(flatten)]
    pub decision: Decision,
    pub response_time_ms: u64,
    /// `None` when the audit write failed; the decision itself stands.
    pub decision_id: Option<Uuid>,
}

/// `POST /synthesize-state` body. An empty body means "synthesize fresh".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizeRequest {
    #[serde(rename = "scenarioState")]
    pub scenario_state: Option<StatePatch>,
    #[serde(rename = "baseState")]
    pub base_state: Option<VehicleState>,
    pub preset: Option<String>,
}

impl SynthesizeRequest {
    /// Preset fields first, `scenarioState` on top.
    pub fn patch(&self) -> Result<StatePatch, ValidationError> {
        let preset = self
            .preset
            .as_deref()
            .map(str::parse::<Preset>)
            .transpose()?;
        let base = preset.map(|p| p.patch()).unwrap_or_default();
        Ok(match &self.scenario_state {
            Some(scenario) => base.overlay(scenario),
            None => base,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    /// `None` when the state record could not be persisted.
    pub id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub state: VehicleState,
}
