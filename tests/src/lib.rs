//! Shared patient fixtures for the system scenarios.

use ors_types::{Gender, PatientProfile, VitalsSnapshot};
use serde_json::Value;

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod scenarios;

/// Post-operative patient with several PRODIGY factors and drifting vitals.
pub fn reference_profile() -> PatientProfile {
    PatientProfile {
        age: 62,
        gender: Gender::Male,
        sleep_apnea: true,
        opioid_dosage: 75.0,
        sedative_use: false,
        bmi: Some(31.2),
        copd: Some(false),
        asa_status: Some(2),
    }
}

pub fn reference_vitals() -> VitalsSnapshot {
    VitalsSnapshot {
        recent_breathing_rate: 18.0,
        current_breathing_rate: 21.0,
        heart_rate: 88.0,
        breath_amplitude: 6.0,
        spo2: 94.0,
        etco2: 47.0,
    }
}

pub fn extreme_profile() -> PatientProfile {
    PatientProfile {
        age: 80,
        gender: Gender::Male,
        sleep_apnea: true,
        opioid_dosage: 150.0,
        sedative_use: true,
        bmi: None,
        copd: Some(true),
        asa_status: Some(4),
    }
}

pub fn extreme_vitals() -> VitalsSnapshot {
    VitalsSnapshot {
        recent_breathing_rate: 5.0,
        current_breathing_rate: 5.0,
        heart_rate: 40.0,
        breath_amplitude: 1.0,
        spo2: 80.0,
        etco2: 55.0,
    }
}

/// Young patient on a low dose, no optional factors recorded.
pub fn minimal_profile() -> PatientProfile {
    PatientProfile {
        age: 30,
        gender: Gender::Female,
        sleep_apnea: false,
        opioid_dosage: 20.0,
        sedative_use: false,
        bmi: None,
        copd: None,
        asa_status: None,
    }
}

/// Every reading at the centre of its normal range.
pub fn minimal_vitals() -> VitalsSnapshot {
    VitalsSnapshot {
        recent_breathing_rate: 16.0,
        current_breathing_rate: 16.0,
        heart_rate: 80.0,
        breath_amplitude: 8.5,
        spo2: 97.5,
        etco2: 40.0,
    }
}

/// Flatten a profile and a snapshot into one patient record.
pub fn record(profile: &PatientProfile, vitals: &VitalsSnapshot) -> Value {
    let mut merged = serde_json::Map::new();
    for half in [serde_json::to_value(profile), serde_json::to_value(vitals)] {
        if let Ok(Value::Object(fields)) = half {
            merged.extend(fields);
        }
    }
    Value::Object(merged)
}
