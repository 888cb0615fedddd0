//! Real-time physiological readings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ValidationReport, ValueRange};
use crate::traits::{check_range, Validatable};

pub const BREATHING_RATE_RANGE: ValueRange = ValueRange::at_least(0.0);
pub const HEART_RATE_RANGE: ValueRange = ValueRange::at_least(0.0);
pub const BREATH_AMPLITUDE_RANGE: ValueRange = ValueRange::new(0.0, 10.0);
pub const SPO2_RANGE: ValueRange = ValueRange::new(0.0, 100.0);
pub const ETCO2_RANGE: ValueRange = ValueRange::at_least(0.0);

/// Vital signs that receive their own deviation sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    BreathingRate,
    HeartRate,
    BreathAmplitude,
    Spo2,
    Etco2,
}

impl VitalSign {
    pub const ALL: [VitalSign; 5] = [
        VitalSign::BreathingRate,
        VitalSign::HeartRate,
        VitalSign::BreathAmplitude,
        VitalSign::Spo2,
        VitalSign::Etco2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VitalSign::BreathingRate => "breathing_rate",
            VitalSign::HeartRate => "heart_rate",
            VitalSign::BreathAmplitude => "breath_amplitude",
            VitalSign::Spo2 => "spo2",
            VitalSign::Etco2 => "etco2",
        }
    }
}

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of monitor readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsSnapshot {
    /// Breaths per minute over the preceding window.
    pub recent_breathing_rate: f64,
    /// Breaths per minute now.
    pub current_breathing_rate: f64,
    pub heart_rate: f64,
    /// Respiratory effort on a 0–10 scale.
    pub breath_amplitude: f64,
    /// Peripheral oxygen saturation, percent.
    pub spo2: f64,
    /// End-tidal CO2, mmHg.
    pub etco2: f64,
}

impl Validatable for VitalsSnapshot {
    fn collect_errors(&self, report: &mut ValidationReport) {
        check_range(
            report,
            "recent_breathing_rate",
            self.recent_breathing_rate,
            BREATHING_RATE_RANGE,
        );
        check_range(
            report,
            "current_breathing_rate",
            self.current_breathing_rate,
            BREATHING_RATE_RANGE,
        );
        check_range(report, "heart_rate", self.heart_rate, HEART_RATE_RANGE);
        check_range(
            report,
            "breath_amplitude",
            self.breath_amplitude,
            BREATH_AMPLITUDE_RANGE,
        );
        check_range(report, "spo2", self.spo2, SPO2_RANGE);
        check_range(report, "etco2", self.etco2, ETCO2_RANGE);
    }
}
