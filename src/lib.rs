// Care-Plan Intake - Core Library
// Field validation + duplicate detection for provider, patient and order submissions

pub mod records;      // Candidates + read-only snapshot types
pub mod validation;   // Format Validator
pub mod similarity;   // Pluggable name scoring
pub mod config;       // Detector thresholds
pub mod error;        // Contract errors
pub mod deduplication; // Duplicate Detector
pub mod screening;    // Validate-then-detect flow
pub mod snapshot;     // CSV loaders for stored records

// Re-export commonly used types
pub use records::{
    Candidate, RecordId, RecordSnapshot,
    ProviderCandidate, PatientCandidate, OrderCandidate,
    ExistingProvider, ExistingPatient, ExistingOrder,
    find_provider_by_npi, find_patient_by_mrn,
};
pub use validation::{
    Outcome, ValidationResult, MAX_AGE_YEARS,
    validate_npi, validate_mrn, validate_icd10, validate_dob, validate_dob_with_limit,
    validate_required, validate_icd10_list,
    validate_provider, validate_patient, validate_order,
    normalize_npi, normalize_mrn, normalize_icd10,
    parse_comma_separated_codes, parse_medication_history,
    all_valid, failures,
};
pub use similarity::{
    NameSimilarity, SimilarityPolicy,
    ExactNormalized, JaroWinkler, NormalizedLevenshtein, SharedSignificantToken,
    normalize_person_name,
};
pub use config::DetectorConfig;
pub use error::DetectorError;
pub use deduplication::{
    DuplicateDetector, DuplicateFinding, DuplicateCategory, Severity,
    DuplicateRule, RuleFamily, DUPLICATE_RULES,
    apply_precedence, has_blocking, highest_severity,
};
pub use screening::{Screener, Screening, Verdict};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
