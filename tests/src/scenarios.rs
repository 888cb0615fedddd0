use std::sync::Once;

use ors_engine::{RiskEngine, ScoringConfig};
use ors_types::{FieldError, Gender, RiskLevel, VitalSign, AGE_RANGE};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::*;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn engine() -> RiskEngine {
    RiskEngine::new(ScoringConfig::default()).unwrap()
}

#[test]
fn reference_patient_needs_regular_monitoring() {
    init_logger();
    let a = engine()
        .assess(&reference_profile(), &reference_vitals())
        .unwrap();
    assert_eq!(a.prodigy_score, 45.714);
    assert_eq!(a.subscore(VitalSign::BreathingRate), 0.722);
    assert_eq!(a.subscore(VitalSign::HeartRate), 0.0);
    assert_eq!(a.ors, 0.499);
    assert_eq!(a.risk_level, RiskLevel::Moderate);
    assert_eq!(a.risk_level.guidance(), "Regular Monitoring");
}

#[test]
fn extreme_patient_is_critical() {
    init_logger();
    let a = engine().assess(&extreme_profile(), &extreme_vitals()).unwrap();
    assert_eq!(a.prodigy_score, 100.0);
    for vital in VitalSign::ALL {
        assert_eq!(a.subscore(vital), 1.0, "{vital} should be saturated");
    }
    assert_eq!(a.ors, 1.0);
    assert_eq!(a.risk_level, RiskLevel::Critical);
}

#[test]
fn extreme_vitals_stay_critical_for_a_female_patient_with_a_stable_trend() {
    let mut profile = extreme_profile();
    profile.gender = Gender::Female;
    let mut vitals = extreme_vitals();
    vitals.recent_breathing_rate = 12.0;
    let a = engine().assess(&profile, &vitals).unwrap();
    assert_eq!(a.prodigy_score, 85.965);
    assert_eq!(a.ors, 0.961);
    assert_eq!(a.risk_level, RiskLevel::Critical);
}

#[test]
fn healthy_patient_is_minimal() {
    init_logger();
    let a = engine().assess(&minimal_profile(), &minimal_vitals()).unwrap();
    assert_eq!(a.prodigy_score, 5.455);
    assert!(a.deviation_subscores.values().all(|&s| s == 0.0));
    assert_eq!(a.ors, 0.012);
    assert_eq!(a.risk_level, RiskLevel::Minimal);
}

#[test]
fn flat_record_and_typed_inputs_agree() {
    let e = engine();
    for (profile, vitals) in [
        (reference_profile(), reference_vitals()),
        (extreme_profile(), extreme_vitals()),
        (minimal_profile(), minimal_vitals()),
    ] {
        let typed = e.assess(&profile, &vitals).unwrap();
        let flat = e.assess_record(&record(&profile, &vitals)).unwrap();
        assert_eq!(typed, flat);
    }
}

#[test]
fn child_with_missing_dose_gets_both_errors() {
    let mut input = record(&minimal_profile(), &minimal_vitals());
    input["age"] = json!(10);
    if let Some(fields) = input.as_object_mut() {
        fields.remove("opioid_dosage");
    }
    let report = engine().assess_record(&input).unwrap_err();
    assert_eq!(
        report.errors,
        vec![
            FieldError::out_of_range("age", 10.0, AGE_RANGE),
            FieldError::missing("opioid_dosage"),
        ]
    );
}

#[test]
fn falling_saturation_walks_up_the_bands() {
    let e = engine();
    let profile = reference_profile();
    let mut previous = (0.0, RiskLevel::Minimal);
    for spo2 in [97.0, 95.0, 94.0, 92.0, 90.0, 88.0, 85.0, 80.0, 70.0] {
        let mut vitals = reference_vitals();
        vitals.spo2 = spo2;
        let a = e.assess(&profile, &vitals).unwrap();
        assert!(a.ors >= previous.0, "ors dropped at spo2 {spo2}");
        assert!(a.risk_level >= previous.1, "band dropped at spo2 {spo2}");
        previous = (a.ors, a.risk_level);
    }
    assert_eq!(previous.1, RiskLevel::Moderate);
}

#[test]
fn normal_saturation_drops_reference_patient_to_low() {
    let mut vitals = reference_vitals();
    vitals.spo2 = 96.0;
    let a = engine().assess(&reference_profile(), &vitals).unwrap();
    assert_eq!(a.ors, 0.446);
    assert_eq!(a.risk_level, RiskLevel::Low);
}

#[test]
fn male_offset_is_smaller_than_leaving_any_normal_range() {
    let e = engine();
    let baseline = e
        .assess(&minimal_profile(), &minimal_vitals())
        .unwrap()
        .ors;

    let mut male = minimal_profile();
    male.gender = Gender::Male;
    let male_delta = e.assess(&male, &minimal_vitals()).unwrap().ors - baseline;
    assert!(male_delta > 0.0);

    let nudges: [fn(&mut ors_types::VitalsSnapshot); 4] = [
        |v| v.spo2 = 94.9,
        |v| v.breath_amplitude = 6.9,
        |v| v.etco2 = 45.1,
        |v| v.heart_rate = 100.1,
    ];
    for nudge in nudges {
        let mut vitals = minimal_vitals();
        nudge(&mut vitals);
        let delta = e.assess(&minimal_profile(), &vitals).unwrap().ors - baseline;
        assert!(
            delta > male_delta,
            "vital effect {delta} not above male offset {male_delta}"
        );
    }
}
