//! Blend of the static and dynamic sub-scores into the overall risk score.

use crate::config::{CombinationWeights, SensitivityCurve};
use crate::deviation::{clamp_unit, DeviationScores};

/// Weighted linear blend in `[0, 1]`. `prodigy` is on its native 0–100 scale.
pub fn linear_blend(prodigy: f64, deviations: &DeviationScores, weights: &CombinationWeights) -> f64 {
    let blend = weights.prodigy * clamp_unit(prodigy / 100.0)
        + weights.breathing * deviations.breathing
        + weights.heart_rate * deviations.heart_rate
        + weights.amplitude * deviations.amplitude
        + weights.oxygenation * deviations.oxygenation(weights.spo2_share);
    clamp_unit(blend)
}

/// Convex exponential map `[0, 1] -> [0, 1]` fixing both endpoints.
///
/// Pulls mid-range blends down and widens the spread near the top, so a
/// deteriorating patient climbs through the upper bands faster.
pub fn sensitivity(linear: f64, curve: &SensitivityCurve) -> f64 {
    let x = clamp_unit(linear);
    let k = curve.steepness;
    if !(k.is_finite() && k > 0.0) {
        return x;
    }
    clamp_unit(((k * x).exp_m1()) / k.exp_m1())
}

pub fn overall_risk(
    prodigy: f64,
    deviations: &DeviationScores,
    weights: &CombinationWeights,
    curve: &SensitivityCurve,
) -> f64 {
    let linear = linear_blend(prodigy, deviations, weights);
    let ors = sensitivity(linear, curve);
    log::debug!("linear blend {linear:.5} -> ors {ors:.5}");
    ors
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn flat(value: f64) -> DeviationScores {
        DeviationScores {
            breathing: value,
            heart_rate: value,
            amplitude: value,
            spo2: value,
            etco2: value,
        }
    }

    #[test]
    fn blend_spans_the_unit_interval() {
        let w = CombinationWeights::default();
        assert_eq!(linear_blend(0.0, &flat(0.0), &w), 0.0);
        assert!((linear_blend(100.0, &flat(1.0), &w) - 1.0).abs() < EPS);
    }

    #[test]
    fn blend_uses_each_weight() {
        let w = CombinationWeights::default();
        let mut d = flat(0.0);
        d.breathing = 1.0;
        assert!((linear_blend(0.0, &d, &w) - 0.30).abs() < EPS);
        assert!((linear_blend(40.0, &flat(0.0), &w) - 0.10).abs() < EPS);
        let mut d = flat(0.0);
        d.spo2 = 1.0;
        assert!((linear_blend(0.0, &d, &w) - 0.10).abs() < EPS);
    }

    #[test]
    fn sensitivity_fixes_endpoints_and_stays_below_identity() {
        let c = SensitivityCurve::default();
        assert_eq!(sensitivity(0.0, &c), 0.0);
        assert!((sensitivity(1.0, &c) - 1.0).abs() < EPS);
        let mid = sensitivity(0.5, &c);
        assert!(mid < 0.5 && mid > 0.45);
    }

    #[test]
    fn sensitivity_clamps_out_of_range_input() {
        let c = SensitivityCurve::default();
        assert_eq!(sensitivity(-0.3, &c), 0.0);
        assert!((sensitivity(7.0, &c) - 1.0).abs() < EPS);
        assert_eq!(sensitivity(f64::NAN, &c), 0.0);
    }

    proptest! {
        #[test]
        fn sensitivity_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0, k in 0.01f64..10.0) {
            let c = SensitivityCurve { steepness: k };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(sensitivity(lo, &c) <= sensitivity(hi, &c) + EPS);
        }
    }
}
