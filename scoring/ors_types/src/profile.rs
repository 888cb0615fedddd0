//! Static clinical history used by the PRODIGY sub-score.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FieldError, ValidationReport, ValueRange};
use crate::traits::{check_range, Validatable};

pub const AGE_RANGE: ValueRange = ValueRange::new(18.0, 100.0);
pub const BMI_RANGE: ValueRange = ValueRange::new(15.0, 60.0);
pub const ASA_RANGE: ValueRange = ValueRange::new(1.0, 4.0);
pub const OPIOID_DOSAGE_RANGE: ValueRange = ValueRange::at_least(0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALLOWED: &'static [&'static str] = &["male", "female"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = FieldError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(FieldError::InvalidEnumValue {
                field: "gender",
                value: s.to_string(),
                allowed: Gender::ALLOWED,
            }),
        }
    }
}

/// Validated static risk factors of one patient.
///
/// Optional factors are `None` when the caller did not provide them; the
/// PRODIGY scorer then leaves them out entirely instead of scoring a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u32,
    pub gender: Gender,
    pub sleep_apnea: bool,
    /// Daily opioid dose in morphine milligram equivalents.
    pub opioid_dosage: f64,
    pub sedative_use: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copd: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asa_status: Option<u8>,
}

impl Validatable for PatientProfile {
    fn collect_errors(&self, report: &mut ValidationReport) {
        check_range(report, "age", f64::from(self.age), AGE_RANGE);
        check_range(
            report,
            "opioid_dosage",
            self.opioid_dosage,
            OPIOID_DOSAGE_RANGE,
        );
        if let Some(bmi) = self.bmi {
            check_range(report, "bmi", bmi, BMI_RANGE);
        }
        if let Some(asa) = self.asa_status {
            check_range(report, "asa_status", f64::from(asa), ASA_RANGE);
        }
    }
}
