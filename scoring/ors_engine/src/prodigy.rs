//! PRODIGY static risk sub-score.
//!
//! Independent factor functions each award points and report the most they
//! could ever award. The score is the earned share of the attainable maximum,
//! scaled to 0–100. Optional factors the caller did not provide add to neither
//! side of that ratio.

use ors_types::{Gender, PatientProfile};

use crate::config::{AgeStep, BmiTier, OpioidTiers, ProdigyPoints};

/// Raw points behind a PRODIGY score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProdigyBreakdown {
    pub points: f64,
    pub max_points: f64,
    /// `100 * points / max_points`, or 0 when nothing could be earned.
    pub score: f64,
}

#[derive(Default)]
struct Tally {
    points: f64,
    max_points: f64,
}

impl Tally {
    fn add(&mut self, factor: &'static str, points: f64, max_points: f64) {
        log::trace!("prodigy {factor}: {points} of {max_points}");
        self.points += points;
        self.max_points += max_points;
    }
}

pub fn score_profile(profile: &PatientProfile, table: &ProdigyPoints) -> ProdigyBreakdown {
    let mut tally = Tally::default();

    tally.add(
        "age",
        age_points(profile.age, &table.age_steps),
        max_of(table.age_steps.iter().map(|s| s.points)),
    );
    let gender_points = match profile.gender {
        Gender::Male => table.male,
        Gender::Female => 0.0,
    };
    tally.add("gender", gender_points, table.male);
    tally.add(
        "sleep_apnea",
        flag_points(profile.sleep_apnea, table.sleep_apnea),
        table.sleep_apnea,
    );
    tally.add(
        "opioid_dosage",
        opioid_points(profile.opioid_dosage, &table.opioid),
        max_of([table.opioid.low, table.opioid.moderate, table.opioid.high]),
    );

    if let Some(copd) = profile.copd {
        tally.add("copd", flag_points(copd, table.copd), table.copd);
    }
    if let Some(bmi) = profile.bmi {
        tally.add(
            "bmi",
            bmi_points(bmi, &table.bmi_tiers),
            max_of(table.bmi_tiers.iter().map(|t| t.points)),
        );
    }
    if let Some(asa) = profile.asa_status {
        tally.add(
            "asa_status",
            asa_points(asa, &table.asa_points),
            max_of(table.asa_points),
        );
    }

    let mut points = tally.points;
    let max_points = tally.max_points * table.sedative_multiplier;
    if profile.sedative_use {
        points *= table.sedative_multiplier;
    }

    let score = if max_points > 0.0 && max_points.is_finite() {
        (100.0 * points / max_points).clamp(0.0, 100.0)
    } else {
        0.0
    };
    log::debug!("prodigy: {points} of {max_points} points -> {score:.3}");

    ProdigyBreakdown {
        points,
        max_points,
        score,
    }
}

/// Points of the highest age step reached.
pub fn age_points(age: u32, steps: &[AgeStep]) -> f64 {
    max_of(
        steps
            .iter()
            .filter(|s| age >= s.min_age)
            .map(|s| s.points),
    )
}

pub fn opioid_points(dosage: f64, tiers: &OpioidTiers) -> f64 {
    if dosage < tiers.low_max {
        tiers.low
    } else if dosage > tiers.high_min {
        tiers.high
    } else {
        tiers.moderate
    }
}

/// Points of the highest BMI tier strictly exceeded.
pub fn bmi_points(bmi: f64, tiers: &[BmiTier]) -> f64 {
    max_of(tiers.iter().filter(|t| bmi > t.above).map(|t| t.points))
}

pub fn asa_points(class: u8, table: &[f64; 4]) -> f64 {
    let idx = usize::from(class.clamp(1, 4)) - 1;
    table[idx]
}

fn flag_points(present: bool, points: f64) -> f64 {
    if present {
        points
    } else {
        0.0
    }
}

fn max_of<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().fold(0.0, f64::max)
}
