//! Caller-input error taxonomy.
//!
//! Every problem found while validating a patient profile or a vitals snapshot
//! is reported as a [`FieldError`]. Validation never stops at the first problem:
//! the complete list travels back to the caller inside a [`ValidationReport`].

use serde::Serialize;
use std::fmt;

/// Inclusive numeric bounds used in range checks and error messages.
///
/// `max == None` means the range is open upward (e.g. a dosage that only has
/// to be non-negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    /// True when `value` is finite and within the bounds (both ends inclusive).
    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() || value < self.min {
            return false;
        }
        match self.max {
            Some(max) => value <= max,
            None => true,
        }
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, ">= {}", self.min),
        }
    }
}

/// A single offending input field.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: &'static str },

    #[error("field '{field}' value {value} is outside the allowed range {expected}")]
    OutOfRangeValue {
        field: &'static str,
        value: f64,
        expected: ValueRange,
    },

    #[error("field '{field}' expected {expected}, found {found}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("field '{field}' has value '{value}', expected one of {allowed:?}")]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

impl FieldError {
    pub fn missing(field: &'static str) -> Self {
        FieldError::MissingRequiredField { field }
    }

    pub fn out_of_range(field: &'static str, value: f64, expected: ValueRange) -> Self {
        FieldError::OutOfRangeValue {
            field,
            value,
            expected,
        }
    }

    pub fn invalid_type<S: Into<String>>(
        field: &'static str,
        expected: &'static str,
        found: S,
    ) -> Self {
        FieldError::InvalidType {
            field,
            expected,
            found: found.into(),
        }
    }

    /// Name of the field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::MissingRequiredField { field }
            | FieldError::OutOfRangeValue { field, .. }
            | FieldError::InvalidType { field, .. }
            | FieldError::InvalidEnumValue { field, .. } => field,
        }
    }
}

/// The complete set of validation failures for one request.
///
/// A report is never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if some error refers to `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// `Ok(())` when nothing was collected, otherwise the report itself.
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid input field(s)", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  - {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl From<FieldError> for ValidationReport {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}
