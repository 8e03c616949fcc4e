//! Thresholds the cascade compares against. Units: km/h, %, °C.

pub use crate::vehicle::derived::{CRITICAL_BATTERY_THRESHOLD, DISTRACTION_ALERT_THRESHOLD};

pub const FATIGUE_ALERT_THRESHOLD: f64 = 70.0;

pub const SIMPLIFIED_NAVIGATION_SPEED: f64 = 60.0;
pub const VOICE_CONTROL_SPEED: f64 = 80.0;
pub const WINDOW_SPEED_LIMIT: f64 = 80.0;
pub const AMBIENT_LIGHT_SPEED_LIMIT: f64 = 60.0;

pub const HOT_CABIN_C: f64 = 28.0;
pub const COLD_CABIN_C: f64 = 18.0;
pub const COMFORT_TEMP_C: f64 = 22.0;
pub const PARKED_COOLING_TARGET_C: f64 = 24.0;
pub const ALERTNESS_TEMP_C: f64 = 20.0;

/// Distraction mode clamps the AR overlay to its minimum.
pub const DISTRACTED_AR_OPACITY: f64 = 0.3;

pub const RANGE_KM_PER_PERCENT: f64 = 3.5;

/// Whole kilometres of range left at `battery_percentage`.
pub fn estimated_range_km(battery_percentage: f64) -> u32 {
    (battery_percentage * RANGE_KM_PER_PERCENT).floor().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_floored() {
        assert_eq!(estimated_range_km(5.0), 17);
        assert_eq!(estimated_range_km(9.0), 31);
        assert_eq!(estimated_range_km(0.0), 0);
    }
}
