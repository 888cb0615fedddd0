//! Vitals deviation sub-scores.
//!
//! Each function is total: any `f64` goes in, a value in `[0, 1]` comes out.
//! Range checking is the validator's job; here an implausible reading is simply
//! clamped to the nearest meaningful score.

use std::collections::BTreeMap;

use ors_types::{VitalSign, VitalsSnapshot};

use crate::config::{Tail, VitalsBands};

/// Per-vital deviation sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationScores {
    pub breathing: f64,
    pub heart_rate: f64,
    pub amplitude: f64,
    pub spo2: f64,
    pub etco2: f64,
}

impl DeviationScores {
    /// SpO2/EtCO2 bucket: `spo2_share` of SpO2 plus the rest of EtCO2.
    pub fn oxygenation(&self, spo2_share: f64) -> f64 {
        clamp_unit(spo2_share * self.spo2 + (1.0 - spo2_share) * self.etco2)
    }

    pub fn get(&self, vital: VitalSign) -> f64 {
        match vital {
            VitalSign::BreathingRate => self.breathing,
            VitalSign::HeartRate => self.heart_rate,
            VitalSign::BreathAmplitude => self.amplitude,
            VitalSign::Spo2 => self.spo2,
            VitalSign::Etco2 => self.etco2,
        }
    }

    pub fn to_map(&self) -> BTreeMap<VitalSign, f64> {
        VitalSign::ALL.iter().map(|&v| (v, self.get(v))).collect()
    }
}

pub fn score_vitals(vitals: &VitalsSnapshot, bands: &VitalsBands) -> DeviationScores {
    let scores = DeviationScores {
        breathing: breathing_score(
            vitals.recent_breathing_rate,
            vitals.current_breathing_rate,
            bands,
        ),
        heart_rate: heart_rate_score(vitals.heart_rate, bands),
        amplitude: amplitude_score(vitals.breath_amplitude, bands),
        spo2: spo2_score(vitals.spo2, bands),
        etco2: etco2_score(vitals.etco2, bands),
    };
    log::trace!("deviation sub-scores: {scores:?}");
    scores
}

/// Score of `value` against one side of a normal range; zero inside the range.
///
/// With `x` the distance past the edge in units of the edge-to-critical span:
/// `onset + (critical_level - onset)·x + amplification·(x-1)₊² + severe_amplification·(x-xₛ)₊²`.
pub fn tail_score(value: f64, tail: &Tail) -> f64 {
    let offset = tail.critical - tail.edge;
    let distance = (value - tail.edge) * offset.signum();
    if !(distance > 0.0) {
        return 0.0;
    }
    let span = offset.abs();
    let x = distance / span;
    if !x.is_finite() {
        return 1.0;
    }

    let c = &tail.curve;
    let mut score = c.onset
        + (c.critical_level - c.onset) * x
        + c.amplification * (x - 1.0).max(0.0).powi(2);
    if let Some(severe) = tail.severe {
        let xs = (severe - tail.edge).abs() / span;
        score += c.severe_amplification * (x - xs).max(0.0).powi(2);
    }
    clamp_unit(score)
}

/// Level of the current rate combined with its trend against the recent rate.
pub fn breathing_score(recent: f64, current: f64, bands: &VitalsBands) -> f64 {
    let level = breathing_level(current, bands);
    let trend = breathing_trend(recent, current, bands);
    clamp_unit(1.0 - (1.0 - level) * (1.0 - trend))
}

pub fn breathing_level(current: f64, bands: &VitalsBands) -> f64 {
    tail_score(current, &bands.breathing_low).max(tail_score(current, &bands.breathing_high))
}

/// Trend term in `[0, 1]`.
///
/// Up to the upper edge of the normal band only a fall counts; above it only
/// a rise counts, at its own (lower) weight.
pub fn breathing_trend(recent: f64, current: f64, bands: &VitalsBands) -> f64 {
    if !(recent.is_finite() && recent > 0.0 && current.is_finite()) {
        return 0.0;
    }
    let change = (current - recent) / recent;
    let t = &bands.breathing_trend;
    let term = if current <= bands.breathing_high.edge {
        t.fall_weight * saturating_square((-change).max(0.0) / t.fall_full_scale)
    } else {
        t.rise_weight * saturating_square(change.max(0.0) / t.rise_full_scale)
    };
    clamp_unit(term)
}

pub fn heart_rate_score(rate: f64, bands: &VitalsBands) -> f64 {
    tail_score(rate, &bands.heart_rate_low).max(tail_score(rate, &bands.heart_rate_high))
}

pub fn amplitude_score(amplitude: f64, bands: &VitalsBands) -> f64 {
    tail_score(amplitude, &bands.amplitude)
}

pub fn spo2_score(spo2: f64, bands: &VitalsBands) -> f64 {
    tail_score(spo2, &bands.spo2)
}

pub fn etco2_score(etco2: f64, bands: &VitalsBands) -> f64 {
    tail_score(etco2, &bands.etco2_low).max(tail_score(etco2, &bands.etco2_high))
}

fn saturating_square(x: f64) -> f64 {
    x.min(1.0).powi(2)
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
