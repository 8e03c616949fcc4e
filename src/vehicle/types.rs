use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::scenario::ScenarioKind;

pub const SAFETY_LEVEL_MIN: u8 = 1;
pub const SAFETY_LEVEL_MAX: u8 = 5;

/// Transmission position as reported by the vehicle bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gear {
    #[serde(rename = "P")]
    Park,
    #[serde(rename = "R")]
    Reverse,
    #[serde(rename = "N")]
    Neutral,
    #[serde(rename = "D")]
    Drive,
}

impl Gear {
    pub fn code(&self) -> &'static str {
        match self {
            Gear::Park => "P",
            Gear::Reverse => "R",
            Gear::Neutral => "N",
            Gear::Drive => "D",
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gear {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P" | "p" => Ok(Gear::Park),
            "R" | "r" => Ok(Gear::Reverse),
            "N" | "n" => Ok(Gear::Neutral),
            "D" | "d" => Ok(Gear::Drive),
            other => Err(ValidationError::new(
                "gear",
                format!("expected one of P, R, N, D, got {:?}", other),
            )),
        }
    }
}

/// A field-level rejection raised at the service boundary.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(field, "field is required")
    }
}

pub(crate) fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("{} is outside {}..={}", value, min, max),
        ));
    }
    Ok(())
}

pub(crate) fn check_safety_level(value: u8) -> Result<(), ValidationError> {
    if !(SAFETY_LEVEL_MIN..=SAFETY_LEVEL_MAX).contains(&value) {
        return Err(ValidationError::new(
            "safety_level",
            format!("{} is outside {}..={}", value, SAFETY_LEVEL_MIN, SAFETY_LEVEL_MAX),
        ));
    }
    Ok(())
}

fn check_speed(speed: f64) -> Result<(), ValidationError> {
    check_range("speed", speed, 0.0, f64::MAX)
}

/// Snapshot the policy engine evaluates a command against.
///
/// Optional readings are "unknown" when absent: guards that need them do not fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleContext {
    pub gear: Gear,
    /// km/h
    pub speed: f64,
    pub distraction_level: f64,
    pub safety_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_percentage: Option<f64>,
    /// °C
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabin_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatigue_level: Option<f64>,
    #[serde(default)]
    pub aeb_triggered: bool,
}

impl VehicleContext {
    /// Minimal context: everything optional left unknown.
    pub fn new(gear: Gear, speed: f64, distraction_level: f64, safety_level: u8) -> Self {
        Self {
            gear,
            speed,
            distraction_level,
            safety_level,
            battery_percentage: None,
            cabin_temp: None,
            weather: None,
            fatigue_level: None,
            aeb_triggered: false,
        }
    }

    pub fn with_battery(mut self, percentage: f64) -> Self {
        self.battery_percentage = Some(percentage);
        self
    }

    pub fn with_cabin_temp(mut self, celsius: f64) -> Self {
        self.cabin_temp = Some(celsius);
        self
    }

    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.weather = Some(weather.into());
        self
    }

    pub fn with_fatigue(mut self, level: f64) -> Self {
        self.fatigue_level = Some(level);
        self
    }

    pub fn with_aeb(mut self, triggered: bool) -> Self {
        self.aeb_triggered = triggered;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_speed(self.speed)?;
        check_range("distraction_level", self.distraction_level, 0.0, 100.0)?;
        check_safety_level(self.safety_level)?;
        if let Some(battery) = self.battery_percentage {
            check_range("battery_percentage", battery, 0.0, 100.0)?;
        }
        if let Some(temp) = self.cabin_temp {
            check_range("cabin_temp", temp, -40.0, 60.0)?;
        }
        if let Some(fatigue) = self.fatigue_level {
            check_range("fatigue_level", fatigue, 0.0, 100.0)?;
        }
        Ok(())
    }
}

/// Full simulated sensor record produced by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub speed: f64,
    pub gear: Gear,
    pub safety_level: u8,
    pub distraction_level: f64,
    /// Derived from `safety_level` and `distraction_level`; never set directly.
    pub ar_opacity: f64,
    pub battery_percentage: f64,
    pub cabin_temp: f64,
    pub location: String,
    pub weather: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driving_duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatigue_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rear_distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_keeping: Option<String>,
    #[serde(default)]
    pub aeb_triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_type: Option<ScenarioKind>,
}

impl VehicleState {
    /// The subset of the record the policy engine reads.
    pub fn context(&self) -> VehicleContext {
        VehicleContext {
            gear: self.gear,
            speed: self.speed,
            distraction_level: self.distraction_level,
            safety_level: self.safety_level,
            battery_percentage: Some(self.battery_percentage),
            cabin_temp: Some(self.cabin_temp),
            weather: Some(self.weather.clone()),
            fatigue_level: self.fatigue_level,
            aeb_triggered: self.aeb_triggered,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.context().validate()?;
        for (field, value) in [
            ("driving_duration_minutes", self.driving_duration_minutes),
            ("front_distance_m", self.front_distance_m),
            ("rear_distance_m", self.rear_distance_m),
        ] {
            if let Some(v) = value {
                check_range(field, v, 0.0, f64::MAX)?;
            }
        }
        Ok(())
    }
}

/// Caller-supplied fields for the override path. Absent fields keep the base value.
///
/// Unknown keys (e.g. a persisted record's `id`) are ignored so a client can send
/// back a full record with a few fields changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatePatch {
    pub speed: Option<f64>,
    pub gear: Option<Gear>,
    pub safety_level: Option<u8>,
    pub distraction_level: Option<f64>,
    pub battery_percentage: Option<f64>,
    pub cabin_temp: Option<f64>,
    pub location: Option<String>,
    pub weather: Option<String>,
    pub driving_duration_minutes: Option<f64>,
    pub fatigue_level: Option<f64>,
    pub front_distance_m: Option<f64>,
    pub rear_distance_m: Option<f64>,
    pub lane_keeping: Option<String>,
    pub aeb_triggered: Option<bool>,
    pub scenario_type: Option<ScenarioKind>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        *self == StatePatch::default()
    }

    /// Shallow merge: every field present in `self` replaces the base value.
    /// Derived fields are left as they are; callers re-derive afterwards.
    pub fn apply_to(&self, base: &VehicleState) -> VehicleState {
        let mut next = base.clone();
        if let Some(v) = self.speed {
            next.speed = v;
        }
        if let Some(v) = self.gear {
            next.gear = v;
        }
        if let Some(v) = self.safety_level {
            next.safety_level = v;
        }
        if let Some(v) = self.distraction_level {
            next.distraction_level = v;
        }
        if let Some(v) = self.battery_percentage {
            next.battery_percentage = v;
        }
        if let Some(v) = self.cabin_temp {
            next.cabin_temp = v;
        }
        if let Some(v) = &self.location {
            next.location = v.clone();
        }
        if let Some(v) = &self.weather {
            next.weather = v.clone();
        }
        if self.driving_duration_minutes.is_some() {
            next.driving_duration_minutes = self.driving_duration_minutes;
        }
        if self.fatigue_level.is_some() {
            next.fatigue_level = self.fatigue_level;
        }
        if self.front_distance_m.is_some() {
            next.front_distance_m = self.front_distance_m;
        }
        if self.rear_distance_m.is_some() {
            next.rear_distance_m = self.rear_distance_m;
        }
        if self.lane_keeping.is_some() {
            next.lane_keeping = self.lane_keeping.clone();
        }
        if let Some(v) = self.aeb_triggered {
            next.aeb_triggered = v;
        }
        if self.scenario_type.is_some() {
            next.scenario_type = self.scenario_type;
        }
        next
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn overlay(&self, other: &StatePatch) -> StatePatch {
        StatePatch {
            speed: other.speed.or(self.speed),
            gear: other.gear.or(self.gear),
            safety_level: other.safety_level.or(self.safety_level),
            distraction_level: other.distraction_level.or(self.distraction_level),
            battery_percentage: other.battery_percentage.or(self.battery_percentage),
            cabin_temp: other.cabin_temp.or(self.cabin_temp),
            location: other.location.clone().or_else(|| self.location.clone()),
            weather: other.weather.clone().or_else(|| self.weather.clone()),
            driving_duration_minutes: other
                .driving_duration_minutes
                .or(self.driving_duration_minutes),
            fatigue_level: other.fatigue_level.or(self.fatigue_level),
            front_distance_m: other.front_distance_m.or(self.front_distance_m),
            rear_distance_m: other.rear_distance_m.or(self.rear_distance_m),
            lane_keeping: other.lane_keeping.clone().or_else(|| self.lane_keeping.clone()),
            aeb_triggered: other.aeb_triggered.or(self.aeb_triggered),
            scenario_type: other.scenario_type.or(self.scenario_type),
        }
    }

    /// Read the patch as a complete record. Core readings are required; optional
    /// readings stay `None` when absent. `ar_opacity` is left at zero for the caller
    /// to derive.
    pub fn to_state(&self) -> Result<VehicleState, ValidationError> {
        Ok(VehicleState {
            speed: self.speed.ok_or_else(|| ValidationError::missing("speed"))?,
            gear: self.gear.ok_or_else(|| ValidationError::missing("gear"))?,
            safety_level: self
                .safety_level
                .ok_or_else(|| ValidationError::missing("safety_level"))?,
            distraction_level: self
                .distraction_level
                .ok_or_else(|| ValidationError::missing("distraction_level"))?,
            ar_opacity: 0.0,
            battery_percentage: self
                .battery_percentage
                .ok_or_else(|| ValidationError::missing("battery_percentage"))?,
            cabin_temp: self
                .cabin_temp
                .ok_or_else(|| ValidationError::missing("cabin_temp"))?,
            location: self
                .location
                .clone()
                .ok_or_else(|| ValidationError::missing("location"))?,
            weather: self
                .weather
                .clone()
                .ok_or_else(|| ValidationError::missing("weather"))?,
            driving_duration_minutes: self.driving_duration_minutes,
            fatigue_level: self.fatigue_level,
            front_distance_m: self.front_distance_m,
            rear_distance_m: self.rear_distance_m,
            lane_keeping: self.lane_keeping.clone(),
            aeb_triggered: self.aeb_triggered.unwrap_or(false),
            scenario_type: self.scenario_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gear_parses_codes() {
        assert_eq!("D".parse::<Gear>().unwrap(), Gear::Drive);
        assert_eq!(" r ".parse::<Gear>().unwrap(), Gear::Reverse);
        let err = "X".parse::<Gear>().unwrap_err();
        assert_eq!(err.field, "gear");
    }

    #[test]
    fn context_rejects_out_of_range() {
        let ctx = VehicleContext::new(Gear::Drive, -1.0, 0.0, 3);
        assert_eq!(ctx.validate().unwrap_err().field, "speed");

        let ctx = VehicleContext::new(Gear::Drive, 10.0, 101.0, 3);
        assert_eq!(ctx.validate().unwrap_err().field, "distraction_level");

        let ctx = VehicleContext::new(Gear::Drive, 10.0, 0.0, 0);
        assert_eq!(ctx.validate().unwrap_err().field, "safety_level");

        let ctx = VehicleContext::new(Gear::Drive, 10.0, 0.0, 3).with_battery(f64::NAN);
        assert_eq!(ctx.validate().unwrap_err().field, "battery_percentage");
    }

    #[test]
    fn overlay_prefers_later_fields() {
        let a = StatePatch {
            speed: Some(10.0),
            cabin_temp: Some(20.0),
            ..StatePatch::default()
        };
        let b = StatePatch {
            speed: Some(30.0),
            ..StatePatch::default()
        };
        let merged = a.overlay(&b);
        assert_eq!(merged.speed, Some(30.0));
        assert_eq!(merged.cabin_temp, Some(20.0));
    }

    #[test]
    fn to_state_leaves_absent_readings_unknown() {
        let mut patch = StatePatch {
            speed: Some(0.0),
            gear: Some(Gear::Park),
            safety_level: Some(5),
            distraction_level: Some(0.0),
            battery_percentage: Some(90.0),
            cabin_temp: Some(22.0),
            location: Some("地下车库".into()),
            weather: Some("晴天".into()),
            ..StatePatch::default()
        };
        let state = patch.to_state().unwrap();
        assert_eq!(state.fatigue_level, None);
        assert_eq!(state.front_distance_m, None);
        assert_eq!(state.lane_keeping, None);
        assert_eq!(state.scenario_type, None);
        assert!(!state.aeb_triggered);

        patch.weather = None;
        assert_eq!(patch.to_state().unwrap_err().field, "weather");
    }
}
