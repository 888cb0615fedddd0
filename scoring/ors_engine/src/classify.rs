use ors_types::RiskLevel;

/// Lower bounds of each band, highest first. A score must strictly exceed a
/// bound to enter the band, so a score sitting on a boundary falls below it.
pub const BAND_THRESHOLDS: [(f64, RiskLevel); 4] = [
    (0.85, RiskLevel::Critical),
    (0.70, RiskLevel::High),
    (0.45, RiskLevel::Moderate),
    (0.25, RiskLevel::Low),
];

pub fn classify(ors: f64) -> RiskLevel {
    BAND_THRESHOLDS
        .iter()
        .find(|(bound, _)| ors > *bound)
        .map(|&(_, level)| level)
        .unwrap_or(RiskLevel::Minimal)
}
