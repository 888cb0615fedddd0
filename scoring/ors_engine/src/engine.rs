use serde_json::Value;

use ors_types::{PatientProfile, RiskAssessment, Validatable, ValidationReport, VitalsSnapshot};

use crate::classify::classify;
use crate::combine::overall_risk;
use crate::config::{ConfigError, ScoringConfig};
use crate::deviation::score_vitals;
use crate::prodigy::score_profile;
use crate::validate::validate_record;

/// The scoring pipeline bound to one validated configuration.
///
/// Holds no mutable state; share it freely across threads. Reloading a
/// calibration means building a new engine.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: ScoringConfig,
}

impl RiskEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a typed profile and snapshot.
    ///
    /// The inputs are range-checked again, since a caller can build them
    /// without going through the JSON validator.
    pub fn assess(
        &self,
        profile: &PatientProfile,
        vitals: &VitalsSnapshot,
    ) -> Result<RiskAssessment, ValidationReport> {
        let mut report = ValidationReport::new();
        profile.collect_errors(&mut report);
        vitals.collect_errors(&mut report);
        if !report.is_empty() {
            log::warn!("rejected assessment input: {} invalid field(s)", report.len());
            return Err(report);
        }
        Ok(self.score(profile, vitals))
    }

    /// Validate and score one flat JSON record.
    pub fn assess_record(&self, record: &Value) -> Result<RiskAssessment, ValidationReport> {
        let (profile, vitals) = validate_record(record).map_err(|report| {
            log::warn!("rejected patient record: {} invalid field(s)", report.len());
            report
        })?;
        Ok(self.score(&profile, &vitals))
    }

    fn score(&self, profile: &PatientProfile, vitals: &VitalsSnapshot) -> RiskAssessment {
        let c = &self.config;
        let digits = c.report_precision;

        let prodigy = score_profile(profile, &c.prodigy).score;
        let deviations = score_vitals(vitals, &c.vitals);
        log::debug!("deviation sub-scores: {deviations:?}");
        let raw_ors = overall_risk(prodigy, &deviations, &c.weights, &c.sensitivity);
        // Band thresholds apply to the exact score, not the reported one.
        let risk_level = classify(raw_ors);
        log::debug!("ors {raw_ors} -> {risk_level}");

        RiskAssessment {
            prodigy_score: round_to(prodigy, digits),
            deviation_subscores: deviations
                .to_map()
                .into_iter()
                .map(|(vital, score)| (vital, round_to(score, digits)))
                .collect(),
            ors: round_to(raw_ors, digits),
            risk_level,
        }
    }
}

/// Round half away from zero to `digits` decimals.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}
