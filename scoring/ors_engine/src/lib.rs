//! Opioid respiratory risk scoring.
//!
//! A validated patient profile and vitals snapshot flow through two
//! independent scorers (PRODIGY static risk, vitals deviation), a weighted
//! blend with a sensitivity curve and finally a five-band classifier.
//! [`RiskEngine`] wires the stages to one [`ScoringConfig`].

pub mod classify;
pub mod combine;
pub mod config;
pub mod deviation;
pub mod engine;
pub mod prodigy;
pub mod validate;

pub use classify::classify;
pub use config::{ConfigError, ScoringConfig};
pub use deviation::DeviationScores;
pub use engine::RiskEngine;
pub use prodigy::ProdigyBreakdown;
pub use validate::{validate_profile, validate_record, validate_vitals};

#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static INIT: Once = Once::new();

/// Route `log` output of unit tests through the test harness.
#[cfg(test)]
pub(crate) fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}
