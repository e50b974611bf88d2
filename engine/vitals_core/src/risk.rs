//! Rule-based clinical risk scoring.
//!
//! Every rule in the table is evaluated, in order, against the raw reading.
//! Rules on the same vital stack: a heart rate of 125 fires both the
//! "Elevated heart rate" and the "Tachycardia" rule.

use serde::{Deserialize, Serialize};

use crate::reading::VitalsReading;

pub const MAX_RISK_SCORE: u8 = 100;

const MEDIUM_RISK_FROM: u8 = 30;
const HIGH_RISK_FROM: u8 = 60;

/// Named clinical condition flagged by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    #[serde(rename = "Elevated heart rate")]
    ElevatedHeartRate,
    Tachycardia,
    Bradycardia,
    #[serde(rename = "Low oxygen saturation")]
    LowOxygenSaturation,
    Hypoxemia,
    Fever,
    #[serde(rename = "High fever")]
    HighFever,
}

impl RiskFactor {
    pub fn label(self) -> &'static str {
        match self {
            RiskFactor::ElevatedHeartRate => "Elevated heart rate",
            RiskFactor::Tachycardia => "Tachycardia",
            RiskFactor::Bradycardia => "Bradycardia",
            RiskFactor::LowOxygenSaturation => "Low oxygen saturation",
            RiskFactor::Hypoxemia => "Hypoxemia",
            RiskFactor::Fever => "Fever",
            RiskFactor::HighFever => "High fever",
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score < MEDIUM_RISK_FROM {
            RiskLevel::Low
        } else if score < HIGH_RISK_FROM {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vital {
    HeartRate,
    Spo2,
    Temperature,
}

impl Vital {
    fn read(self, reading: &VitalsReading) -> f64 {
        match self {
            Vital::HeartRate => reading.heart_rate,
            Vital::Spo2 => reading.spo2,
            Vital::Temperature => reading.temperature,
        }
    }
}

/// Strict comparison against a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Above(f64),
    Below(f64),
}

impl Threshold {
    fn is_met(self, value: f64) -> bool {
        match self {
            Threshold::Above(limit) => value > limit,
            Threshold::Below(limit) => value < limit,
        }
    }
}

/// One independent predicate contributing points and a factor when it fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskRule {
    pub vital: Vital,
    pub threshold: Threshold,
    pub points: u8,
    pub factor: RiskFactor,
}

impl RiskRule {
    pub const fn new(vital: Vital, threshold: Threshold, points: u8, factor: RiskFactor) -> Self {
        Self {
            vital,
            threshold,
            points,
            factor,
        }
    }

    pub fn fires(&self, reading: &VitalsReading) -> bool {
        self.threshold.is_met(self.vital.read(reading))
    }
}

/// Rule table in evaluation order
pub const STANDARD_RULES: [RiskRule; 7] = [
    RiskRule::new(Vital::HeartRate, Threshold::Above(100.0), 20, RiskFactor::ElevatedHeartRate),
    RiskRule::new(Vital::HeartRate, Threshold::Above(120.0), 30, RiskFactor::Tachycardia),
    RiskRule::new(Vital::HeartRate, Threshold::Below(60.0), 20, RiskFactor::Bradycardia),
    RiskRule::new(Vital::Spo2, Threshold::Below(95.0), 25, RiskFactor::LowOxygenSaturation),
    RiskRule::new(Vital::Spo2, Threshold::Below(90.0), 35, RiskFactor::Hypoxemia),
    RiskRule::new(Vital::Temperature, Threshold::Above(37.5), 15, RiskFactor::Fever),
    RiskRule::new(Vital::Temperature, Threshold::Above(38.5), 25, RiskFactor::HighFever),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    /// Fired factors in rule order
    pub risk_factors: Vec<RiskFactor>,
}

/// Additive scorer over an ordered rule table.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    rules: Vec<RiskRule>,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::with_rules(STANDARD_RULES.to_vec())
    }
}

impl RiskScorer {
    pub fn with_rules(rules: Vec<RiskRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    pub fn score(&self, reading: &VitalsReading) -> RiskAssessment {
        let mut total: u32 = 0;
        let mut risk_factors = Vec::new();

        for rule in self.rules.iter().filter(|rule| rule.fires(reading)) {
            total += u32::from(rule.points);
            if !risk_factors.contains(&rule.factor) {
                risk_factors.push(rule.factor);
            }
        }

        let risk_score = total.min(u32::from(MAX_RISK_SCORE)) as u8;
        RiskAssessment {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            risk_factors,
        }
    }
}

/// Score a reading against [`STANDARD_RULES`].
pub fn score_risk(reading: &VitalsReading) -> RiskAssessment {
    RiskScorer::default().score(reading)
}
