// Validation contract shared by the input records

use crate::error::{FieldError, ValidationReport};

/// Exhaustive validation: implementors push every violation they find into
/// `report` instead of returning on the first one.
pub trait Validatable {
    fn collect_errors(&self, report: &mut ValidationReport);

    /// Convenience wrapper returning all violations at once.
    fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        self.collect_errors(&mut report);
        report.into_result()
    }
}

/// Push an `OutOfRangeValue` when `value` falls outside `range`.
pub(crate) fn check_range(
    report: &mut ValidationReport,
    field: &'static str,
    value: f64,
    range: crate::error::ValueRange,
) {
    if !range.contains(value) {
        report.push(FieldError::out_of_range(field, value, range));
    }
}
