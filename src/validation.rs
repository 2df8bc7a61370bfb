// ✅ Format Validator - field syntax checks for intake submissions
// Pure functions: every check returns a ValidationResult, malformed input is
// an invalid result and never an error.

use crate::records::{OrderCandidate, PatientCandidate, ProviderCandidate};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Oldest plausible patient, in whole years
pub const MAX_AGE_YEARS: u32 = 120;

/// Letter + 2 digits, optionally "." + 1-4 alphanumerics. Case-insensitive.
static ICD10_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][0-9]{2}(\.[A-Za-z0-9]{1,4})?$").expect("ICD-10 pattern is a valid regex")
});

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub outcome: Outcome,
    pub field: String,

    /// Why the field was rejected (None when valid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn valid(field: &str) -> Self {
        ValidationResult {
            outcome: Outcome::Valid,
            field: field.to_string(),
            reason: None,
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationResult {
            outcome: Outcome::Invalid,
            field: field.to_string(),
            reason: Some(reason.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == Outcome::Valid
    }
}

/// True when no result in the batch is invalid
pub fn all_valid(results: &[ValidationResult]) -> bool {
    results.iter().all(ValidationResult::is_valid)
}

/// Only the rejected fields of a batch
pub fn failures(results: &[ValidationResult]) -> Vec<&ValidationResult> {
    results.iter().filter(|r| !r.is_valid()).collect()
}

// ============================================================================
// FIELD VALIDATORS
// ============================================================================

fn is_ascii_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// NPI: exactly 10 ASCII digits
pub fn validate_npi(npi: &str) -> ValidationResult {
    if npi.is_empty() {
        return ValidationResult::invalid("npi", "NPI is required");
    }
    if !is_ascii_digits(npi, 10) {
        return ValidationResult::invalid("npi", "NPI must be exactly 10 digits");
    }
    ValidationResult::valid("npi")
}

/// MRN: exactly 6 ASCII digits
pub fn validate_mrn(mrn: &str) -> ValidationResult {
    if mrn.is_empty() {
        return ValidationResult::invalid("mrn", "MRN is required");
    }
    if !is_ascii_digits(mrn, 6) {
        return ValidationResult::invalid("mrn", "MRN must be exactly 6 digits");
    }
    ValidationResult::valid("mrn")
}

/// ICD-10 shape: A00 or A00.0000
pub fn validate_icd10(code: &str) -> ValidationResult {
    if code.is_empty() {
        return ValidationResult::invalid("diagnosis_code", "ICD-10 code is required");
    }
    if !ICD10_PATTERN.is_match(code) {
        return ValidationResult::invalid(
            "diagnosis_code",
            "Invalid ICD-10 code format. Expected format: A00 or A00.0000",
        );
    }
    ValidationResult::valid("diagnosis_code")
}

/// Date of birth against the default 120-year limit
pub fn validate_dob(dob: NaiveDate, today: NaiveDate) -> ValidationResult {
    validate_dob_with_limit(dob, today, MAX_AGE_YEARS)
}

/// Date of birth: not after `today`, age in whole calendar years within 0..=max_age_years
pub fn validate_dob_with_limit(dob: NaiveDate, today: NaiveDate, max_age_years: u32) -> ValidationResult {
    match today.years_since(dob) {
        // years_since is None only when dob is after today
        None => ValidationResult::invalid("dob", "Date of birth cannot be in the future"),
        Some(age) if age > max_age_years => ValidationResult::invalid(
            "dob",
            format!("Date of birth indicates age over {} years", max_age_years),
        ),
        Some(_) => ValidationResult::valid("dob"),
    }
}

/// Present and non-blank after trimming
pub fn validate_required(field: &str, value: Option<&str>) -> ValidationResult {
    match value {
        Some(v) if !v.trim().is_empty() => ValidationResult::valid(field),
        _ => ValidationResult::invalid(field, format!("{} is required", field)),
    }
}

/// Validate a list of ICD-10 codes, skipping blanks.
/// Returns the normalized codes, or every rejected entry.
pub fn validate_icd10_list(codes: &[String]) -> Result<Vec<String>, Vec<ValidationResult>> {
    let mut validated = Vec::new();
    let mut errors = Vec::new();

    for (i, code) in codes.iter().enumerate() {
        let code = normalize_icd10(code);
        if code.is_empty() {
            continue;
        }

        let result = validate_icd10(&code);
        if result.is_valid() {
            validated.push(code);
        } else {
            errors.push(ValidationResult::invalid(
                &format!("additional_diagnoses[{}]", i),
                format!(
                    "Code '{}': {}",
                    code,
                    result.reason.unwrap_or_default()
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}

// ============================================================================
// NORMALIZATION & PARSING
// ============================================================================

pub fn normalize_npi(value: &str) -> String {
    value.trim().to_string()
}

pub fn normalize_mrn(value: &str) -> String {
    value.trim().to_string()
}

pub fn normalize_icd10(value: &str) -> String {
    value.trim().to_uppercase()
}

/// "I10, K21.0, G70.00" -> ["I10", "K21.0", "G70.00"]
pub fn parse_comma_separated_codes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(normalize_icd10)
        .filter(|c| !c.is_empty())
        .collect()
}

/// "Prednisone, Pyridostigmine" -> ["Prednisone", "Pyridostigmine"]
pub fn parse_medication_history(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

// ============================================================================
// CANDIDATE VALIDATION
// ============================================================================
// Identifiers are normalized (trimmed) before the strict field checks run.

pub fn validate_provider(candidate: &ProviderCandidate) -> Vec<ValidationResult> {
    vec![
        validate_required("name", Some(candidate.name.as_str())),
        validate_npi(&normalize_npi(&candidate.npi)),
    ]
}

pub fn validate_patient(
    candidate: &PatientCandidate,
    today: NaiveDate,
    max_age_years: u32,
) -> Vec<ValidationResult> {
    vec![
        validate_required("first_name", Some(candidate.first_name.as_str())),
        validate_required("last_name", Some(candidate.last_name.as_str())),
        validate_mrn(&normalize_mrn(&candidate.mrn)),
        validate_dob_with_limit(candidate.dob, today, max_age_years),
    ]
}

pub fn validate_order(candidate: &OrderCandidate) -> Vec<ValidationResult> {
    vec![
        validate_icd10(&normalize_icd10(&candidate.diagnosis_code)),
        validate_required("medication_name", Some(candidate.medication_name.as_str())),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
