//! Raw-input validation.
//!
//! Turns untyped JSON into a [`PatientProfile`] and a [`VitalsSnapshot`].
//! Every field is checked independently and every problem is reported, so one
//! round trip tells the caller everything that is wrong with a record.
//!
//! A `null` value is treated the same as an absent field. Unknown fields are
//! ignored so records may carry identifiers or notes alongside the inputs.

use serde_json::{Map, Value};

use ors_types::{
    FieldError, Gender, PatientProfile, ValidationReport, ValueRange, VitalsSnapshot, AGE_RANGE,
    ASA_RANGE, BMI_RANGE, BREATHING_RATE_RANGE, BREATH_AMPLITUDE_RANGE, ETCO2_RANGE,
    HEART_RATE_RANGE, OPIOID_DOSAGE_RANGE, SPO2_RANGE,
};

/// Validate a profile given on its own.
pub fn validate_profile(input: &Value) -> Result<PatientProfile, ValidationReport> {
    let fields = as_object(input, "profile")?;
    let mut report = ValidationReport::new();
    let profile = read_profile(fields, &mut report);
    finish(profile, report)
}

/// Validate a vitals snapshot given on its own.
pub fn validate_vitals(input: &Value) -> Result<VitalsSnapshot, ValidationReport> {
    let fields = as_object(input, "vitals")?;
    let mut report = ValidationReport::new();
    let vitals = read_vitals(fields, &mut report);
    finish(vitals, report)
}

/// Validate one flat record holding both the profile and the vitals fields.
///
/// Errors from both halves come back together in a single report.
pub fn validate_record(
    input: &Value,
) -> Result<(PatientProfile, VitalsSnapshot), ValidationReport> {
    let fields = as_object(input, "record")?;
    let mut report = ValidationReport::new();
    let profile = read_profile(fields, &mut report);
    let vitals = read_vitals(fields, &mut report);
    let pair = match (profile, vitals) {
        (Some(p), Some(v)) => Some((p, v)),
        _ => None,
    };
    finish(pair, report)
}

fn finish<T>(value: Option<T>, report: ValidationReport) -> Result<T, ValidationReport> {
    match value {
        Some(value) if report.is_empty() => Ok(value),
        _ => Err(report),
    }
}

fn as_object<'a>(
    input: &'a Value,
    what: &'static str,
) -> Result<&'a Map<String, Value>, ValidationReport> {
    input
        .as_object()
        .ok_or_else(|| FieldError::invalid_type(what, "object", describe(input)).into())
}

fn read_profile(fields: &Map<String, Value>, report: &mut ValidationReport) -> Option<PatientProfile> {
    let mut r = FieldReader::new(fields, report);

    let age = r.required_integer("age", AGE_RANGE);
    let gender = r.required_gender("gender");
    let sleep_apnea = r.required_bool("sleep_apnea");
    let opioid_dosage = r.required_number("opioid_dosage", OPIOID_DOSAGE_RANGE);
    let sedative_use = r.required_bool("sedative_use");
    let bmi = r.optional_number("bmi", BMI_RANGE);
    let copd = r.optional_bool("copd");
    let asa_status = r.optional_integer("asa_status", ASA_RANGE);

    if r.failed() {
        return None;
    }
    Some(PatientProfile {
        // Integral and range-checked above.
        age: age? as u32,
        gender: gender?,
        sleep_apnea: sleep_apnea?,
        opioid_dosage: opioid_dosage?,
        sedative_use: sedative_use?,
        bmi,
        copd,
        asa_status: asa_status.map(|a| a as u8),
    })
}

fn read_vitals(fields: &Map<String, Value>, report: &mut ValidationReport) -> Option<VitalsSnapshot> {
    let mut r = FieldReader::new(fields, report);

    let recent_breathing_rate = r.required_number("recent_breathing_rate", BREATHING_RATE_RANGE);
    let current_breathing_rate =
        r.required_number("current_breathing_rate", BREATHING_RATE_RANGE);
    let heart_rate = r.required_number("heart_rate", HEART_RATE_RANGE);
    let breath_amplitude = r.required_number("breath_amplitude", BREATH_AMPLITUDE_RANGE);
    let spo2 = r.required_number("spo2", SPO2_RANGE);
    let etco2 = r.required_number("etco2", ETCO2_RANGE);

    if r.failed() {
        return None;
    }
    Some(VitalsSnapshot {
        recent_breathing_rate: recent_breathing_rate?,
        current_breathing_rate: current_breathing_rate?,
        heart_rate: heart_rate?,
        breath_amplitude: breath_amplitude?,
        spo2: spo2?,
        etco2: etco2?,
    })
}

/// Typed field access that records every failure instead of returning it.
struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    report: &'a mut ValidationReport,
    errors_before: usize,
}

impl<'a> FieldReader<'a> {
    fn new(fields: &'a Map<String, Value>, report: &'a mut ValidationReport) -> Self {
        let errors_before = report.len();
        Self {
            fields,
            report,
            errors_before,
        }
    }

    fn failed(&self) -> bool {
        self.report.len() > self.errors_before
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn require(&mut self, field: &'static str) -> Option<&'a Value> {
        let value = self.get(field);
        if value.is_none() {
            self.report.push(FieldError::missing(field));
        }
        value
    }

    fn required_number(&mut self, field: &'static str, range: ValueRange) -> Option<f64> {
        let value = self.require(field)?;
        self.number(field, value, range)
    }

    fn optional_number(&mut self, field: &'static str, range: ValueRange) -> Option<f64> {
        let value = self.get(field)?;
        self.number(field, value, range)
    }

    fn required_integer(&mut self, field: &'static str, range: ValueRange) -> Option<f64> {
        let value = self.require(field)?;
        self.integer(field, value, range)
    }

    fn optional_integer(&mut self, field: &'static str, range: ValueRange) -> Option<f64> {
        let value = self.get(field)?;
        self.integer(field, value, range)
    }

    fn required_bool(&mut self, field: &'static str) -> Option<bool> {
        let value = self.require(field)?;
        self.boolean(field, value)
    }

    fn optional_bool(&mut self, field: &'static str) -> Option<bool> {
        let value = self.get(field)?;
        self.boolean(field, value)
    }

    fn required_gender(&mut self, field: &'static str) -> Option<Gender> {
        let value = self.require(field)?;
        let Some(text) = value.as_str() else {
            self.report
                .push(FieldError::invalid_type(field, "string", describe(value)));
            return None;
        };
        match text.parse::<Gender>() {
            Ok(gender) => Some(gender),
            Err(err) => {
                self.report.push(err);
                None
            }
        }
    }

    fn number(&mut self, field: &'static str, value: &Value, range: ValueRange) -> Option<f64> {
        let Some(number) = value.as_f64() else {
            self.report
                .push(FieldError::invalid_type(field, "number", describe(value)));
            return None;
        };
        self.in_range(field, number, range)
    }

    /// Integral JSON floats such as `62.0` are accepted.
    fn integer(&mut self, field: &'static str, value: &Value, range: ValueRange) -> Option<f64> {
        match value.as_f64() {
            Some(number) if number.fract() == 0.0 => self.in_range(field, number, range),
            _ => {
                self.report
                    .push(FieldError::invalid_type(field, "integer", describe(value)));
                None
            }
        }
    }

    fn boolean(&mut self, field: &'static str, value: &Value) -> Option<bool> {
        let flag = value.as_bool();
        if flag.is_none() {
            self.report
                .push(FieldError::invalid_type(field, "boolean", describe(value)));
        }
        flag
    }

    fn in_range(&mut self, field: &'static str, number: f64, range: ValueRange) -> Option<f64> {
        if range.contains(number) {
            Some(number)
        } else {
            self.report
                .push(FieldError::out_of_range(field, number, range));
            None
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
