use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::vitals::VitalSign;

/// Ordered risk bands, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "minimal",
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Suggested monitoring posture for the band.
    pub fn guidance(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "Routine Care",
            RiskLevel::Low => "Standard Monitoring",
            RiskLevel::Moderate => "Regular Monitoring",
            RiskLevel::High => "Close Monitoring Required",
            RiskLevel::Critical => "Immediate Intervention Required",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one scoring call. Built once by the engine and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Static sub-score, 0–100.
    pub prodigy_score: f64,
    /// Per-vital deviation sub-scores, each 0–1.
    pub deviation_subscores: BTreeMap<VitalSign, f64>,
    /// Overall risk score, 0–1.
    pub ors: f64,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    pub fn subscore(&self, vital: VitalSign) -> f64 {
        self.deviation_subscores.get(&vital).copied().unwrap_or(0.0)
    }
}
