//! Scoring coefficients.
//!
//! Every number the pipeline uses to turn inputs into a score lives here so a
//! clinical recalibration is a JSON edit, not a code change. The `Default`
//! values are the calibration shipped with the crate; a JSON document only
//! needs to name the settings it overrides.

use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;
const MAX_STEEPNESS: f64 = 50.0;
const MAX_PRECISION: u32 = 9;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read scoring config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scoring config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scoring config setting '{setting}': {reason}")]
    Invalid { setting: String, reason: String },
}

impl ConfigError {
    fn invalid<S: Into<String>, R: Into<String>>(setting: S, reason: R) -> Self {
        ConfigError::Invalid {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}

/// Complete set of coefficients for one scoring process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub prodigy: ProdigyPoints,
    pub vitals: VitalsBands,
    pub weights: CombinationWeights,
    pub sensitivity: SensitivityCurve,
    /// Decimal places kept in the reported scores.
    pub report_precision: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            prodigy: ProdigyPoints::default(),
            vitals: VitalsBands::default(),
            weights: CombinationWeights::default(),
            sensitivity: SensitivityCurve::default(),
            report_precision: 3,
        }
    }
}

/// Reaching `min_age` awards `points` (the highest reached step wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeStep {
    pub min_age: u32,
    pub points: f64,
}

/// A BMI strictly above `above` awards `points` (the highest tier wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiTier {
    pub above: f64,
    pub points: f64,
}

/// Opioid dose tiers in MME: `< low_max` is low, `> high_min` is high,
/// everything in between (bounds included) is moderate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpioidTiers {
    pub low_max: f64,
    pub high_min: f64,
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
}

impl Default for OpioidTiers {
    fn default() -> Self {
        Self {
            low_max: 50.0,
            high_min: 100.0,
            low: 3.0,
            moderate: 6.0,
            high: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProdigyPoints {
    pub age_steps: Vec<AgeStep>,
    pub male: f64,
    pub sleep_apnea: f64,
    pub copd: f64,
    pub opioid: OpioidTiers,
    /// Applied to the accumulated static points when sedatives are in use.
    pub sedative_multiplier: f64,
    pub bmi_tiers: Vec<BmiTier>,
    /// Points for ASA classes 1..=4.
    pub asa_points: [f64; 4],
}

impl Default for ProdigyPoints {
    fn default() -> Self {
        Self {
            age_steps: vec![
                AgeStep {
                    min_age: 60,
                    points: 8.0,
                },
                AgeStep {
                    min_age: 70,
                    points: 12.0,
                },
                AgeStep {
                    min_age: 80,
                    points: 16.0,
                },
            ],
            male: 8.0,
            sleep_apnea: 10.0,
            copd: 7.0,
            opioid: OpioidTiers::default(),
            sedative_multiplier: 1.25,
            bmi_tiers: vec![
                BmiTier {
                    above: 30.0,
                    points: 2.0,
                },
                BmiTier {
                    above: 35.0,
                    points: 4.0,
                },
                BmiTier {
                    above: 40.0,
                    points: 6.0,
                },
            ],
            asa_points: [0.0, 2.0, 4.0, 6.0],
        }
    }
}

/// Shape of a deviation tail in normalized distance `x`, where `x = 0` is the
/// edge of the normal range and `x = 1` the critical threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviationCurve {
    /// Score just past the normal-range edge.
    pub onset: f64,
    /// Score at the critical threshold.
    pub critical_level: f64,
    /// Coefficient of `(x - 1)^2` past the critical threshold.
    pub amplification: f64,
    /// Coefficient of the squared distance past the severe threshold.
    pub severe_amplification: f64,
}

impl DeviationCurve {
    pub fn standard() -> Self {
        Self {
            onset: 0.65,
            critical_level: 0.9,
            amplification: 1.0,
            severe_amplification: 0.0,
        }
    }

    /// Gentler ramp with a second amplification stage; used for SpO2.
    pub fn staged() -> Self {
        Self {
            onset: 0.5,
            critical_level: 0.65,
            amplification: 0.05,
            severe_amplification: 0.3,
        }
    }
}

impl Default for DeviationCurve {
    fn default() -> Self {
        Self::standard()
    }
}

/// One side of a vital's normal range. Whether it is a lower or an upper tail
/// follows from which side of `edge` the `critical` threshold lies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tail {
    pub edge: f64,
    pub critical: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severe: Option<f64>,
    #[serde(default)]
    pub curve: DeviationCurve,
}

impl Tail {
    pub fn new(edge: f64, critical: f64) -> Self {
        Self {
            edge,
            critical,
            severe: None,
            curve: DeviationCurve::standard(),
        }
    }

    pub fn with_severe(mut self, severe: f64) -> Self {
        self.severe = Some(severe);
        self
    }

    pub fn with_curve(mut self, curve: DeviationCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn is_lower(&self) -> bool {
        self.critical < self.edge
    }
}

/// Breathing-rate trend: relative change between the recent and current rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingTrend {
    /// Relative fall at which the falling-trend term saturates.
    pub fall_full_scale: f64,
    pub fall_weight: f64,
    /// Relative rise at which the rising-trend term saturates.
    pub rise_full_scale: f64,
    pub rise_weight: f64,
}

impl Default for BreathingTrend {
    fn default() -> Self {
        Self {
            fall_full_scale: 0.4,
            fall_weight: 0.6,
            rise_full_scale: 0.5,
            rise_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsBands {
    pub breathing_low: Tail,
    pub breathing_high: Tail,
    pub breathing_trend: BreathingTrend,
    pub heart_rate_low: Tail,
    pub heart_rate_high: Tail,
    /// Inverted scale: only low effort is penalized.
    pub amplitude: Tail,
    pub spo2: Tail,
    pub etco2_low: Tail,
    pub etco2_high: Tail,
}

impl Default for VitalsBands {
    fn default() -> Self {
        Self {
            breathing_low: Tail::new(12.0, 8.0),
            breathing_high: Tail::new(20.0, 24.0),
            breathing_trend: BreathingTrend::default(),
            heart_rate_low: Tail::new(60.0, 50.0),
            heart_rate_high: Tail::new(100.0, 120.0),
            amplitude: Tail::new(7.0, 3.0),
            spo2: Tail::new(95.0, 90.0)
                .with_severe(85.0)
                .with_curve(DeviationCurve::staged()),
            etco2_low: Tail::new(35.0, 30.0),
            etco2_high: Tail::new(45.0, 50.0),
        }
    }
}

/// Linear blend weights. The five bucket weights must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationWeights {
    pub prodigy: f64,
    pub breathing: f64,
    pub heart_rate: f64,
    pub amplitude: f64,
    pub oxygenation: f64,
    /// SpO2 share of the oxygenation bucket; EtCO2 gets the rest.
    pub spo2_share: f64,
}

impl Default for CombinationWeights {
    fn default() -> Self {
        Self {
            prodigy: 0.25,
            breathing: 0.30,
            heart_rate: 0.15,
            amplitude: 0.10,
            oxygenation: 0.20,
            spo2_share: 0.5,
        }
    }
}

impl CombinationWeights {
    pub fn sum(&self) -> f64 {
        self.prodigy + self.breathing + self.heart_rate + self.amplitude + self.oxygenation
    }
}

/// `ors = (exp(k * linear) - 1) / (exp(k) - 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityCurve {
    pub steepness: f64,
}

impl Default for SensitivityCurve {
    fn default() -> Self {
        Self { steepness: 0.25 }
    }
}

impl ScoringConfig {
    /// Load and validate a JSON calibration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every invariant the scorers rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_weights()?;
        self.validate_prodigy()?;
        self.validate_vitals()?;

        let k = self.sensitivity.steepness;
        if !(k.is_finite() && k > 0.0 && k <= MAX_STEEPNESS) {
            return Err(ConfigError::invalid(
                "sensitivity.steepness",
                format!("must be in (0, {MAX_STEEPNESS}], got {k}"),
            ));
        }
        if self.report_precision > MAX_PRECISION {
            return Err(ConfigError::invalid(
                "report_precision",
                format!("at most {MAX_PRECISION} decimals, got {}", self.report_precision),
            ));
        }
        Ok(())
    }

    fn validate_weights(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        for (name, value) in [
            ("weights.prodigy", w.prodigy),
            ("weights.breathing", w.breathing),
            ("weights.heart_rate", w.heart_rate),
            ("weights.amplitude", w.amplitude),
            ("weights.oxygenation", w.oxygenation),
        ] {
            non_negative(name, value)?;
        }
        let sum = w.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::invalid(
                "weights",
                format!("must sum to 1.0, got {sum}"),
            ));
        }
        unit_interval("weights.spo2_share", w.spo2_share)
    }

    fn validate_prodigy(&self) -> Result<(), ConfigError> {
        let p = &self.prodigy;

        let mut prev: Option<&AgeStep> = None;
        for step in &p.age_steps {
            non_negative("prodigy.age_steps.points", step.points)?;
            if let Some(prev) = prev {
                if step.min_age <= prev.min_age || step.points < prev.points {
                    return Err(ConfigError::invalid(
                        "prodigy.age_steps",
                        "ages must ascend and points must not decrease",
                    ));
                }
            }
            prev = Some(step);
        }

        non_negative("prodigy.male", p.male)?;
        non_negative("prodigy.sleep_apnea", p.sleep_apnea)?;
        non_negative("prodigy.copd", p.copd)?;

        let o = &p.opioid;
        non_negative("prodigy.opioid.low_max", o.low_max)?;
        non_negative("prodigy.opioid.low", o.low)?;
        if !(o.high_min.is_finite() && o.high_min >= o.low_max) {
            return Err(ConfigError::invalid(
                "prodigy.opioid",
                "high_min must be finite and not below low_max",
            ));
        }
        if !(o.low <= o.moderate && o.moderate <= o.high && o.high.is_finite()) {
            return Err(ConfigError::invalid(
                "prodigy.opioid",
                "tier points must not decrease from low to high",
            ));
        }

        let m = p.sedative_multiplier;
        if !(m.is_finite() && m >= 1.0) {
            return Err(ConfigError::invalid(
                "prodigy.sedative_multiplier",
                format!("must be a finite multiplier >= 1, got {m}"),
            ));
        }

        let mut prev: Option<&BmiTier> = None;
        for tier in &p.bmi_tiers {
            non_negative("prodigy.bmi_tiers.points", tier.points)?;
            if !tier.above.is_finite() {
                return Err(ConfigError::invalid(
                    "prodigy.bmi_tiers.above",
                    "must be finite",
                ));
            }
            if let Some(prev) = prev {
                if tier.above <= prev.above || tier.points < prev.points {
                    return Err(ConfigError::invalid(
                        "prodigy.bmi_tiers",
                        "thresholds must ascend and points must not decrease",
                    ));
                }
            }
            prev = Some(tier);
        }

        let asa = &p.asa_points;
        if asa[0] != 0.0 {
            return Err(ConfigError::invalid(
                "prodigy.asa_points",
                "ASA class 1 must contribute zero points",
            ));
        }
        for pair in asa.windows(2) {
            non_negative("prodigy.asa_points", pair[1])?;
            if pair[1] < pair[0] {
                return Err(ConfigError::invalid(
                    "prodigy.asa_points",
                    "points must not decrease with ASA class",
                ));
            }
        }
        Ok(())
    }

    fn validate_vitals(&self) -> Result<(), ConfigError> {
        let v = &self.vitals;
        for (name, tail, lower) in [
            ("vitals.breathing_low", &v.breathing_low, true),
            ("vitals.breathing_high", &v.breathing_high, false),
            ("vitals.heart_rate_low", &v.heart_rate_low, true),
            ("vitals.heart_rate_high", &v.heart_rate_high, false),
            ("vitals.amplitude", &v.amplitude, true),
            ("vitals.spo2", &v.spo2, true),
            ("vitals.etco2_low", &v.etco2_low, true),
            ("vitals.etco2_high", &v.etco2_high, false),
        ] {
            validate_tail(name, tail, lower)?;
        }

        for (name, low, high) in [
            ("vitals.breathing", &v.breathing_low, &v.breathing_high),
            ("vitals.heart_rate", &v.heart_rate_low, &v.heart_rate_high),
            ("vitals.etco2", &v.etco2_low, &v.etco2_high),
        ] {
            if low.edge > high.edge {
                return Err(ConfigError::invalid(
                    name,
                    "lower normal edge lies above the upper normal edge",
                ));
            }
        }

        let t = &v.breathing_trend;
        for (name, scale) in [
            ("vitals.breathing_trend.fall_full_scale", t.fall_full_scale),
            ("vitals.breathing_trend.rise_full_scale", t.rise_full_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError::invalid(name, "must be positive"));
            }
        }
        unit_interval("vitals.breathing_trend.fall_weight", t.fall_weight)?;
        unit_interval("vitals.breathing_trend.rise_weight", t.rise_weight)
    }
}

fn validate_tail(name: &str, tail: &Tail, lower: bool) -> Result<(), ConfigError> {
    if !(tail.edge.is_finite() && tail.critical.is_finite()) || tail.edge == tail.critical {
        return Err(ConfigError::invalid(
            name,
            "edge and critical must be finite and distinct",
        ));
    }
    if tail.is_lower() != lower {
        let side = if lower { "below" } else { "above" };
        return Err(ConfigError::invalid(
            name,
            format!("critical threshold must lie {side} the normal edge"),
        ));
    }
    if let Some(severe) = tail.severe {
        let beyond = if lower {
            severe < tail.critical
        } else {
            severe > tail.critical
        };
        if !(severe.is_finite() && beyond) {
            return Err(ConfigError::invalid(
                name,
                "severe threshold must lie past the critical threshold",
            ));
        }
    }

    let c = &tail.curve;
    unit_interval(&format!("{name}.curve.onset"), c.onset)?;
    if !(c.critical_level.is_finite() && c.critical_level >= c.onset) {
        return Err(ConfigError::invalid(
            format!("{name}.curve.critical_level"),
            "must be finite and not below onset",
        ));
    }
    non_negative(&format!("{name}.curve.amplification"), c.amplification)?;
    non_negative(
        &format!("{name}.curve.severe_amplification"),
        c.severe_amplification,
    )
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            name,
            format!("must be finite and >= 0, got {value}"),
        ))
    }
}

fn unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            name,
            format!("must be within [0, 1], got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn default_config_is_valid() {
        let config = ScoringConfig::default();
        config.validate().expect("shipped calibration must validate");
        assert!((config.weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn partial_json_overrides_only_named_settings() {
        let config = ScoringConfig::from_json_str(
            r#"{ "sensitivity": { "steepness": 1.5 }, "prodigy": { "male": 4.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.sensitivity.steepness, 1.5);
        assert_eq!(config.prodigy.male, 4.0);
        assert_eq!(config.prodigy.sleep_apnea, 10.0);
        assert_eq!(config.weights, CombinationWeights::default());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let err = ScoringConfig::from_json_str(r#"{ "weights": { "prodigy": 0.5 } }"#)
            .unwrap_err();
        match err {
            ConfigError::Invalid { setting, .. } => assert_eq!(setting, "weights"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn steepness_must_be_positive() {
        let mut config = ScoringConfig::default();
        config.sensitivity.steepness = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tail_direction_is_checked() {
        let mut config = ScoringConfig::default();
        config.vitals.spo2 = Tail::new(95.0, 99.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vitals.spo2"));

        let mut config = ScoringConfig::default();
        config.vitals.spo2 = Tail::new(95.0, 90.0).with_severe(92.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_monotone_tables_are_rejected() {
        let mut config = ScoringConfig::default();
        config.prodigy.asa_points = [0.0, 4.0, 2.0, 6.0];
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.prodigy.opioid.moderate = 1.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.prodigy.sedative_multiplier = 0.8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn opioid_tier_bounds_must_be_finite() {
        for bad in [f64::NAN, f64::INFINITY] {
            let mut config = ScoringConfig::default();
            config.prodigy.opioid.high_min = bad;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("prodigy.opioid"));
        }
    }

    #[test]
    fn load_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.json");
        let mut config = ScoringConfig::default();
        config.prodigy.copd = 9.0;
        fs::write(&path, config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(ScoringConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let err = ScoringConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
