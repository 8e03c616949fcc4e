//! Declarative scenario table.
//!
//! Each scenario is a weight plus one generator per field. Generators are resolved
//! gear-first; the rest may read the resolved gear but nothing else.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::derived::{compute_ar_opacity, compute_safety_level};
use super::types::{Gear, VehicleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    HighwayCruise,
    CityTraffic,
    ReverseParking,
    Parked,
    LowBattery,
    BadWeather,
    EmergencyBrake,
    SchoolPickup,
}

/// Fields already fixed when a dependent generator runs.
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub gear: Gear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GearGen {
    Fixed(Gear),
    /// `first` with probability `chance`, otherwise `second`.
    Either { first: Gear, second: Gear, chance: f64 },
}

impl GearGen {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Gear {
        match *self {
            GearGen::Fixed(gear) => gear,
            GearGen::Either {
                first,
                second,
                chance,
            } => {
                if rng.gen::<f64>() < chance {
                    first
                } else {
                    second
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Fixed(f64),
    /// `min + k` for a uniform integer `k` in `0..width`.
    Whole { min: u32, width: u32 },
    /// Uniform real in `[min, min + width)`.
    Real { min: f64, width: f64 },
    /// With probability `chance` a `Whole { min, width }` draw, otherwise `otherwise`.
    Occasional {
        chance: f64,
        min: u32,
        width: u32,
        otherwise: f64,
    },
    /// 0 in park, otherwise a `Whole { min, width }` draw.
    StillWhenParked { min: u32, width: u32 },
}

fn whole<R: Rng + ?Sized>(rng: &mut R, min: u32, width: u32) -> f64 {
    if width == 0 {
        return f64::from(min);
    }
    f64::from(min + rng.gen_range(0..width))
}

impl Num {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R, resolved: &Resolved) -> f64 {
        match *self {
            Num::Fixed(v) => v,
            Num::Whole { min, width } => whole(rng, min, width),
            Num::Real { min, width } => min + rng.gen::<f64>() * width,
            Num::Occasional {
                chance,
                min,
                width,
                otherwise,
            } => {
                if rng.gen::<f64>() < chance {
                    whole(rng, min, width)
                } else {
                    otherwise
                }
            }
            Num::StillWhenParked { min, width } => {
                if resolved.gear == Gear::Park {
                    0.0
                } else {
                    whole(rng, min, width)
                }
            }
        }
    }

    /// Inclusive bounds every draw falls within.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Num::Fixed(v) => (v, v),
            Num::Whole { min, width } => (f64::from(min), f64::from(min + width.saturating_sub(1))),
            Num::Real { min, width } => (min, min + width),
            Num::Occasional {
                min,
                width,
                otherwise,
                ..
            } => {
                let hi = f64::from(min + width.saturating_sub(1));
                (otherwise.min(f64::from(min)), hi.max(otherwise))
            }
            Num::StillWhenParked { min, width } => (0.0, f64::from(min + width.saturating_sub(1))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Text {
    Fixed(&'static str),
    OneOf(&'static [&'static str]),
}

impl Text {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match *self {
            Text::Fixed(s) => s.to_string(),
            Text::OneOf(options) if options.is_empty() => String::new(),
            Text::OneOf(options) => options[rng.gen_range(0..options.len())].to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioTemplate {
    pub kind: ScenarioKind,
    pub weight: f64,
    pub label: &'static str,
    pub gear: GearGen,
    pub speed: Num,
    pub battery_percentage: Num,
    pub cabin_temp: Num,
    pub location: Text,
    pub weather: Text,
    pub distraction_level: Num,
    pub driving_duration_minutes: Option<Num>,
    pub fatigue_level: Option<Num>,
    pub front_distance_m: Option<Num>,
    pub rear_distance_m: Option<Num>,
    pub lane_keeping: Option<&'static str>,
    pub aeb_triggered: bool,
}

impl ScenarioTemplate {
    /// Draw every field, then fill in the derived ones.
    pub fn realize<R: Rng + ?Sized>(&self, rng: &mut R) -> VehicleState {
        let gear = self.gear.resolve(rng);
        let resolved = Resolved { gear };
        let mut draw = |n: &Num| n.resolve(rng, &resolved);

        let speed = draw(&self.speed);
        let battery_percentage = draw(&self.battery_percentage);
        let cabin_temp = draw(&self.cabin_temp);
        let distraction_level = draw(&self.distraction_level);
        let driving_duration_minutes = self.driving_duration_minutes.as_ref().map(&mut draw);
        let fatigue_level = self.fatigue_level.as_ref().map(&mut draw);
        let front_distance_m = self.front_distance_m.as_ref().map(&mut draw);
        let rear_distance_m = self.rear_distance_m.as_ref().map(&mut draw);
        let location = self.location.resolve(rng);
        let weather = self.weather.resolve(rng);

        let mut state = VehicleState {
            speed,
            gear,
            safety_level: 3,
            distraction_level,
            ar_opacity: 0.5,
            battery_percentage,
            cabin_temp,
            location,
            weather,
            driving_duration_minutes,
            fatigue_level,
            front_distance_m,
            rear_distance_m,
            lane_keeping: self.lane_keeping.map(str::to_string),
            aeb_triggered: self.aeb_triggered,
            scenario_type: Some(self.kind),
        };
        state.safety_level = compute_safety_level(&state);
        state.ar_opacity = compute_ar_opacity(state.safety_level, state.distraction_level);
        state
    }
}

const SUNNY: Text = Text::Fixed("晴天");

pub const SCENARIOS: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        kind: ScenarioKind::HighwayCruise,
        weight: 0.2,
        label: "高速巡航",
        gear: GearGen::Fixed(Gear::Drive),
        speed: Num::Whole { min: 90, width: 20 },
        battery_percentage: Num::Whole { min: 50, width: 30 },
        cabin_temp: Num::Whole { min: 24, width: 4 },
        location: Text::Fixed("高速公路"),
        weather: SUNNY,
        distraction_level: Num::Occasional {
            chance: 0.3,
            min: 60,
            width: 20,
            otherwise: 0.0,
        },
        driving_duration_minutes: Some(Num::Whole { min: 60, width: 60 }),
        fatigue_level: Some(Num::Whole { min: 50, width: 30 }),
        front_distance_m: Some(Num::Whole { min: 60, width: 40 }),
        rear_distance_m: None,
        lane_keeping: Some("good"),
        aeb_triggered: false,
    },
    ScenarioTemplate {
        kind: ScenarioKind::CityTraffic,
        weight: 0.25,
        label: "市区拥堵",
        gear: GearGen::Fixed(Gear::Drive),
        speed: Num::Whole { min: 5, width: 20 },
        battery_percentage: Num::Whole { min: 60, width: 30 },
        cabin_temp: Num::Whole { min: 22, width: 6 },
        location: Text::Fixed("市区拥堵路段"),
        weather: SUNNY,
        distraction_level: Num::Occasional {
            chance: 0.2,
            min: 30,
            width: 30,
            otherwise: 0.0,
        },
        driving_duration_minutes: Some(Num::Whole { min: 20, width: 40 }),
        fatigue_level: None,
        front_distance_m: Some(Num::Whole { min: 3, width: 7 }),
        rear_distance_m: None,
        lane_keeping: None,
        aeb_triggered: false,
    },
    ScenarioTemplate {
        kind: ScenarioKind::ReverseParking,
        weight: 0.1,
        label: "倒车入库",
        gear: GearGen::Fixed(Gear::Reverse),
        speed: Num::Whole { min: 3, width: 5 },
        battery_percentage: Num::Whole { min: 50, width: 40 },
        cabin_temp: Num::Whole { min: 22, width: 4 },
        location: Text::Fixed("停车场"),
        weather: SUNNY,
        distraction_level: Num::Fixed(0.0),
        driving_duration_minutes: None,
        fatigue_level: None,
        front_distance_m: None,
        rear_distance_m: Some(Num::Real {
            min: 0.5,
            width: 2.0,
        }),
        lane_keeping: None,
        aeb_triggered: false,
    },
    ScenarioTemplate {
        kind: ScenarioKind::Parked,
        weight: 0.15,
        label: "停车等待",
        gear: GearGen::Fixed(Gear::Park),
        speed: Num::Fixed(0.0),
        battery_percentage: Num::Whole { min: 40, width: 50 },
        cabin_temp: Num::Whole { min: 20, width: 10 },
        location: Text::OneOf(&["购物中心", "办公楼", "住宅区"]),
        weather: Text::OneOf(&["晴天", "多云"]),
        distraction_level: Num::Fixed(0.0),
        driving_duration_minutes: None,
        fatigue_level: None,
        front_distance_m: None,
        rear_distance_m: None,
        lane_keeping: None,
        aeb_triggered: false,
    },
    ScenarioTemplate {
        kind: ScenarioKind::LowBattery,
        weight: 0.08,
        label: "低电量",
        gear: GearGen::Fixed(Gear::Drive),
        speed: Num::Whole { min: 40, width: 30 },
        battery_percentage: Num::Whole { min: 5, width: 10 },
        cabin_temp: Num::Whole { min: 20, width: 8 },
        location: Text::Fixed("市区道路"),
        weather: SUNNY,
        distraction_level: Num::Fixed(0.0),
        driving_duration_minutes: None,
        fatigue_level: None,
        front_distance_m: Some(Num::Whole { min: 20, width: 30 }),
        rear_distance_m: None,
        lane_keeping: None,
        aeb_triggered: false,
    },
    ScenarioTemplate {
        kind: ScenarioKind::BadWeather,
        weight: 0.12,
        label: "恶劣天气",
        gear: GearGen::Fixed(Gear::Drive),
        speed: Num::Whole { min: 30, width: 25 },
        battery_percentage: Num::Whole { min: 50, width: 30 },
        cabin_temp: Num::Whole { min: 18, width: 6 },
        location: Text::Fixed("市区道路"),
        weather: Text::OneOf(&["大雨", "暴雨", "大雾"]),
        distraction_level: Num::Fixed(0.0),
        driving_duration_minutes: None,
        fatigue_level: None,
        front_distance_m: Some(Num::Whole { min: 8, width: 12 }),
        rear_distance_m: None,
        lane_keeping: None,
        aeb_triggered: false,
    },
    ScenarioTemplate {
        kind: ScenarioKind::EmergencyBrake,
        weight: 0.05,
        label: "紧急制动",
        gear: GearGen::Fixed(Gear::Drive),
        speed: Num::Whole { min: 20, width: 30 },
        battery_percentage: Num::Whole { min: 40, width: 40 },
        cabin_temp: Num::Whole { min: 22, width: 4 },
        location: Text::Fixed("市区道路"),
        weather: SUNNY,
        distraction_level: Num::Fixed(0.0),
        driving_duration_minutes: None,
        fatigue_level: None,
        front_distance_m: Some(Num::Real {
            min: 2.0,
            width: 3.0,
        }),
        rear_distance_m: None,
        lane_keeping: None,
        aeb_triggered: true,
    },
    ScenarioTemplate {
        kind: ScenarioKind::SchoolPickup,
        weight: 0.05,
        label: "接送孩子",
        gear: GearGen::Either {
            first: Gear::Park,
            second: Gear::Drive,
            chance: 0.5,
        },
        speed: Num::StillWhenParked { min: 10, width: 20 },
        battery_percentage: Num::Whole { min: 50, width: 30 },
        cabin_temp: Num::Whole { min: 22, width: 4 },
        location: Text::Fixed("学校区域"),
        weather: SUNNY,
        distraction_level: Num::Fixed(0.0),
        driving_duration_minutes: None,
        fatigue_level: None,
        front_distance_m: Some(Num::Whole { min: 10, width: 20 }),
        rear_distance_m: None,
        lane_keeping: None,
        aeb_triggered: false,
    },
];

pub fn template(kind: ScenarioKind) -> Option<&'static ScenarioTemplate> {
    SCENARIOS.iter().find(|s| s.kind == kind)
}
