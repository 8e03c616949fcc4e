use serde::{Deserialize, Serialize};
use std::fmt;

use super::intent::CommandIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::None => "无风险",
            RiskLevel::Low => "低风险",
            RiskLevel::Medium => "中等风险",
            RiskLevel::High => "高风险",
            RiskLevel::Critical => "极高风险",
        }
    }
}

/// Priority levels of the policy cascade, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Emergency,
    CriticalPower,
    Reverse,
    Parked,
    AdverseWeather,
    HighFatigue,
    HighDistraction,
    Driving,
    Idle,
}

impl Tier {
    pub const ALL: [Tier; 9] = [
        Tier::Emergency,
        Tier::CriticalPower,
        Tier::Reverse,
        Tier::Parked,
        Tier::AdverseWeather,
        Tier::HighFatigue,
        Tier::HighDistraction,
        Tier::Driving,
        Tier::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Emergency => "emergency",
            Tier::CriticalPower => "critical_power",
            Tier::Reverse => "reverse",
            Tier::Parked => "parked",
            Tier::AdverseWeather => "adverse_weather",
            Tier::HighFatigue => "high_fatigue",
            Tier::HighDistraction => "high_distraction",
            Tier::Driving => "driving",
            Tier::Idle => "idle",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a single tier handler, before the engine stamps tier and intent on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Ruling {
    pub allowed: bool,
    pub response: String,
    pub reasoning: String,
    pub actions: Vec<String>,
    pub risk: RiskLevel,
    pub risk_detail: Option<String>,
    pub ar_opacity_override: Option<f64>,
}

impl Ruling {
    pub fn allow(response: impl Into<String>) -> Self {
        Self::new(true, response.into())
    }

    pub fn deny(response: impl Into<String>) -> Self {
        Self::new(false, response.into())
    }

    fn new(allowed: bool, response: String) -> Self {
        Self {
            allowed,
            response,
            reasoning: String::new(),
            actions: Vec::new(),
            risk: RiskLevel::None,
            risk_detail: None,
            ar_opacity_override: None,
        }
    }

    pub fn because(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Append one action after whatever the ruling already lists.
    pub fn also(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn risk(mut self, level: RiskLevel, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.risk = level;
        self.risk_detail = (!detail.is_empty()).then_some(detail);
        self
    }

    pub fn overlay_opacity(mut self, opacity: f64) -> Self {
        self.ar_opacity_override = Some(opacity);
        self
    }

    pub fn into_decision(self, tier: Tier, intent: CommandIntent) -> Decision {
        let risk_assessment = match &self.risk_detail {
            Some(detail) => format!("{}：{}", self.risk.label(), detail),
            None => self.risk.label().to_string(),
        };
        Decision {
            response: self.response,
            reasoning: self.reasoning,
            action_taken: self.actions.join(" | "),
            risk_assessment,
            allowed: self.allowed,
            risk_level: self.risk,
            tier,
            intent,
            ar_opacity_override: self.ar_opacity_override,
        }
    }
}

/// Final, fully-populated answer to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub response: String,
    pub reasoning: String,
    pub action_taken: String,
    pub risk_assessment: String,
    pub allowed: bool,
    pub risk_level: RiskLevel,
    pub tier: Tier,
    pub intent: CommandIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_opacity_override: Option<f64>,
}
