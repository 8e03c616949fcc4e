use crate::vehicle::derived::is_adverse_weather;
use crate::vehicle::types::{Gear, VehicleContext};

use super::decision::{Ruling, Tier};
use super::handlers::{driving, restricted, stationary};
use super::intent::{classify, CommandIntent};
use super::limits::{
    CRITICAL_BATTERY_THRESHOLD, DISTRACTION_ALERT_THRESHOLD, FATIGUE_ALERT_THRESHOLD,
};

/// Everything a tier handler may look at.
#[derive(Debug, Clone)]
pub struct Facts<'a> {
    pub command: &'a str,
    pub lowered: String,
    pub intent: CommandIntent,
    pub ctx: &'a VehicleContext,
}

impl<'a> Facts<'a> {
    pub fn new(command: &'a str, ctx: &'a VehicleContext) -> Self {
        Self {
            command,
            lowered: command.to_lowercase(),
            intent: classify(command),
            ctx,
        }
    }

    /// Raw phrase check, independent of the classified intent.
    pub fn mentions(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.lowered.contains(k))
    }
}

fn moving_forward(ctx: &VehicleContext) -> bool {
    ctx.gear == Gear::Drive && ctx.speed > 0.0
}

impl Tier {
    pub fn guard(&self, ctx: &VehicleContext) -> bool {
        match self {
            Tier::Emergency => ctx.aeb_triggered,
            Tier::CriticalPower => ctx
                .battery_percentage
                .map_or(false, |b| b < CRITICAL_BATTERY_THRESHOLD),
            Tier::Reverse => ctx.gear == Gear::Reverse,
            Tier::Parked => {
                ctx.gear == Gear::Park || (ctx.gear == Gear::Neutral && ctx.speed == 0.0)
            }
            Tier::AdverseWeather => ctx.weather.as_deref().map_or(false, is_adverse_weather),
            Tier::HighFatigue => ctx
                .fatigue_level
                .map_or(false, |f| f > FATIGUE_ALERT_THRESHOLD),
            Tier::HighDistraction => {
                ctx.distraction_level > DISTRACTION_ALERT_THRESHOLD && moving_forward(ctx)
            }
            Tier::Driving => moving_forward(ctx),
            Tier::Idle => true,
        }
    }

    /// `None` means the tier has no rule for this intent and passes the command on.
    pub fn handle(&self, facts: &Facts<'_>) -> Option<Ruling> {
        match self {
            Tier::Emergency => Some(restricted::emergency(facts)),
            Tier::CriticalPower => restricted::critical_power(facts),
            Tier::Reverse => Some(restricted::reverse(facts)),
            Tier::Parked => Some(stationary::parked(facts)),
            Tier::AdverseWeather => restricted::adverse_weather(facts),
            Tier::HighFatigue => restricted::high_fatigue(facts),
            Tier::HighDistraction => Some(restricted::high_distraction(facts)),
            Tier::Driving => Some(driving::driving(facts)),
            Tier::Idle => Some(stationary::idle(facts)),
        }
    }

    /// Tiers that always produce a ruling once their guard holds.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Tier::CriticalPower | Tier::AdverseWeather | Tier::HighFatigue
        )
    }
}

/// Walk the cascade in priority order; the first tier that both guards and rules wins.
pub fn evaluate(facts: &Facts<'_>) -> (Tier, Ruling) {
    Tier::ALL
        .iter()
        .filter(|tier| tier.guard(facts.ctx))
        .find_map(|tier| tier.handle(facts).map(|ruling| (*tier, ruling)))
        .unwrap_or_else(|| (Tier::Idle, stationary::idle(facts)))
}
