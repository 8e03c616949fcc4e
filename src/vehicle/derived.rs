//! Derived safety fields.
//!
//! Both functions are pure and total. Anything that changes an input field must
//! re-run them before the record leaves the crate.

use super::types::{Gear, VehicleState};

/// Substrings that mark low-visibility weather.
pub const ADVERSE_WEATHER_MARKERS: &[&str] = &["雨", "雾", "rain", "fog"];

pub const DISTRACTION_ALERT_THRESHOLD: f64 = 60.0;
pub const CRITICAL_BATTERY_THRESHOLD: f64 = 10.0;
pub const HIGHWAY_SPEED_KMH: f64 = 80.0;

pub const MIN_AR_OPACITY: f64 = 0.3;
pub const MAX_AR_OPACITY: f64 = 0.8;
const FALLBACK_AR_OPACITY: f64 = 0.5;

pub fn is_adverse_weather(weather: &str) -> bool {
    let lower = weather.to_lowercase();
    ADVERSE_WEATHER_MARKERS.iter().any(|m| lower.contains(m))
}

/// 1 (worst) to 5 (best). Most dangerous condition is checked first.
pub fn compute_safety_level(state: &VehicleState) -> u8 {
    if state.aeb_triggered {
        return 1;
    }
    if state.gear == Gear::Reverse {
        return 2;
    }
    if state.battery_percentage < CRITICAL_BATTERY_THRESHOLD {
        return 1;
    }
    if is_adverse_weather(&state.weather) {
        return 2;
    }
    if state.distraction_level > DISTRACTION_ALERT_THRESHOLD {
        return 1;
    }
    match state.gear {
        Gear::Park | Gear::Neutral => 5,
        Gear::Drive if state.speed == 0.0 => 4,
        Gear::Drive if state.speed < HIGHWAY_SPEED_KMH => 3,
        _ => 2,
    }
}

/// Overlay opacity in `[0.3, 0.8]`. Heavy distraction forces the minimal overlay.
pub fn compute_ar_opacity(safety_level: u8, distraction_level: f64) -> f64 {
    if distraction_level > DISTRACTION_ALERT_THRESHOLD {
        return MIN_AR_OPACITY;
    }
    match safety_level {
        5 => 0.3,
        4 => 0.35,
        3 => 0.5,
        2 => 0.6,
        1 => 0.8,
        _ => FALLBACK_AR_OPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_markers_match_both_scripts() {
        assert!(is_adverse_weather("大雨"));
        assert!(is_adverse_weather("大雾"));
        assert!(is_adverse_weather("Heavy Rain"));
        assert!(!is_adverse_weather("晴天"));
        assert!(!is_adverse_weather("Sunny"));
    }

    #[test]
    fn distraction_beats_safety_table() {
        assert_eq!(compute_ar_opacity(1, 61.0), MIN_AR_OPACITY);
        assert_eq!(compute_ar_opacity(1, 60.0), 0.8);
        assert_eq!(compute_ar_opacity(9, 0.0), 0.5);
    }
}
