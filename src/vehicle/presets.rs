//! Scenario-trigger presets from the dashboard's scenario panel.
//!
//! A preset is a partial state that is merged over the current one. Every preset
//! pins `safety_level` explicitly (the override path does not recompute it) and
//! pins the readings that select a policy tier, so leftovers from the current
//! state cannot change which regime the preset lands in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::scenario::ScenarioKind;
use super::types::{Gear, StatePatch, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    MorningCommute,
    WinterColdStart,
    SummerHotCabin,
    HighwayFatigue,
    ParkingEntertainment,
    LowBatteryUrgent,
    IncomingCallDriving,
    EmergencyBrake,
    BadWeather,
    Arrived,
}

impl Preset {
    pub const ALL: [Preset; 10] = [
        Preset::MorningCommute,
        Preset::WinterColdStart,
        Preset::SummerHotCabin,
        Preset::HighwayFatigue,
        Preset::ParkingEntertainment,
        Preset::LowBatteryUrgent,
        Preset::IncomingCallDriving,
        Preset::EmergencyBrake,
        Preset::BadWeather,
        Preset::Arrived,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::MorningCommute => "morning-commute",
            Preset::WinterColdStart => "winter-cold-start",
            Preset::SummerHotCabin => "summer-hot-cabin",
            Preset::HighwayFatigue => "highway-fatigue",
            Preset::ParkingEntertainment => "parking-entertainment",
            Preset::LowBatteryUrgent => "low-battery-urgent",
            Preset::IncomingCallDriving => "incoming-call-driving",
            Preset::EmergencyBrake => "emergency-brake",
            Preset::BadWeather => "bad-weather",
            Preset::Arrived => "arrived",
        }
    }

    /// Command the panel suggests trying right after triggering the preset.
    pub fn suggested_command(&self) -> &'static str {
        match self {
            Preset::MorningCommute => "导航到公司",
            Preset::WinterColdStart => "好冷",
            Preset::SummerHotCabin => "好热",
            Preset::HighwayFatigue => "播放音乐",
            Preset::ParkingEntertainment => "播放音乐",
            Preset::LowBatteryUrgent => "找充电站",
            Preset::IncomingCallDriving => "接听电话",
            Preset::EmergencyBrake => "打开导航",
            Preset::BadWeather => "打开导航",
            Preset::Arrived => "播放视频",
        }
    }

    pub fn patch(&self) -> StatePatch {
        let base = StatePatch::default();
        match self {
            Preset::MorningCommute => StatePatch {
                gear: Some(Gear::Drive),
                speed: Some(15.0),
                safety_level: Some(3),
                distraction_level: Some(0.0),
                location: Some("市区拥堵路段".into()),
                weather: Some("晴天".into()),
                front_distance_m: Some(6.0),
                battery_percentage: Some(80.0),
                cabin_temp: Some(22.0),
                fatigue_level: Some(10.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::CityTraffic),
                ..base
            },
            Preset::WinterColdStart => StatePatch {
                gear: Some(Gear::Park),
                speed: Some(0.0),
                safety_level: Some(5),
                distraction_level: Some(0.0),
                cabin_temp: Some(-5.0),
                weather: Some("晴天".into()),
                location: Some("住宅区".into()),
                battery_percentage: Some(75.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::Parked),
                ..base
            },
            Preset::SummerHotCabin => StatePatch {
                gear: Some(Gear::Park),
                speed: Some(0.0),
                safety_level: Some(5),
                distraction_level: Some(0.0),
                cabin_temp: Some(35.0),
                weather: Some("晴天高温".into()),
                location: Some("购物中心".into()),
                battery_percentage: Some(70.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::Parked),
                ..base
            },
            Preset::HighwayFatigue => StatePatch {
                gear: Some(Gear::Drive),
                speed: Some(120.0),
                safety_level: Some(2),
                distraction_level: Some(4.0),
                fatigue_level: Some(85.0),
                driving_duration_minutes: Some(150.0),
                location: Some("高速公路".into()),
                weather: Some("晴天".into()),
                lane_keeping: Some("fair".into()),
                battery_percentage: Some(55.0),
                cabin_temp: Some(24.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::HighwayCruise),
                ..base
            },
            Preset::ParkingEntertainment => StatePatch {
                gear: Some(Gear::Park),
                speed: Some(0.0),
                safety_level: Some(5),
                distraction_level: Some(0.0),
                location: Some("购物中心".into()),
                battery_percentage: Some(60.0),
                cabin_temp: Some(24.0),
                weather: Some("晴天".into()),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::Parked),
                ..base
            },
            Preset::LowBatteryUrgent => StatePatch {
                gear: Some(Gear::Drive),
                speed: Some(25.0),
                safety_level: Some(2),
                distraction_level: Some(2.0),
                battery_percentage: Some(8.0),
                cabin_temp: Some(24.0),
                location: Some("市区拥堵路段".into()),
                weather: Some("晴天".into()),
                fatigue_level: Some(10.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::LowBattery),
                ..base
            },
            Preset::IncomingCallDriving => StatePatch {
                gear: Some(Gear::Drive),
                speed: Some(60.0),
                safety_level: Some(3),
                distraction_level: Some(0.0),
                location: Some("市区道路".into()),
                weather: Some("晴天".into()),
                battery_percentage: Some(70.0),
                cabin_temp: Some(23.0),
                fatigue_level: Some(10.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::CityTraffic),
                ..base
            },
            Preset::EmergencyBrake => StatePatch {
                gear: Some(Gear::Drive),
                speed: Some(30.0),
                safety_level: Some(1),
                distraction_level: Some(5.0),
                battery_percentage: Some(40.0),
                location: Some("紧急制动路段".into()),
                weather: Some("晴天".into()),
                front_distance_m: Some(2.5),
                aeb_triggered: Some(true),
                cabin_temp: Some(24.0),
                scenario_type: Some(ScenarioKind::EmergencyBrake),
                ..base
            },
            Preset::BadWeather => StatePatch {
                gear: Some(Gear::Drive),
                speed: Some(45.0),
                safety_level: Some(1),
                distraction_level: Some(2.0),
                battery_percentage: Some(65.0),
                cabin_temp: Some(22.0),
                location: Some("市区道路".into()),
                weather: Some("大雨".into()),
                fatigue_level: Some(10.0),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::BadWeather),
                ..base
            },
            Preset::Arrived => StatePatch {
                gear: Some(Gear::Park),
                speed: Some(0.0),
                safety_level: Some(5),
                distraction_level: Some(0.0),
                battery_percentage: Some(60.0),
                cabin_temp: Some(24.0),
                location: Some("商业区 - 购物中心".into()),
                weather: Some("晴天".into()),
                aeb_triggered: Some(false),
                scenario_type: Some(ScenarioKind::Parked),
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| ValidationError::new("preset", format!("unknown preset {:?}", s)))
    }
}
