// 🧾 Screening - validate a submission, then look for duplicates
// Detection only runs once every field passed validation.

use crate::deduplication::{has_blocking, DuplicateDetector, DuplicateFinding};
use crate::error::Result;
use crate::records::{
    Candidate, ExistingOrder, ExistingPatient, ExistingProvider, OrderCandidate,
    PatientCandidate, ProviderCandidate, RecordId, RecordSnapshot,
};
use crate::validation::{all_valid, validate_order, validate_patient, validate_provider, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the caller should do with the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// A field is malformed; fix the input
    Rejected,
    /// A unique identifier is already on file; do not create the record
    Blocked,
    /// Advisory duplicates; proceed only after the user acknowledges them
    NeedsAcknowledgment,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screening {
    pub verdict: Verdict,
    pub validation: Vec<ValidationResult>,
    pub findings: Vec<DuplicateFinding>,
}

impl Screening {
    fn rejected(validation: Vec<ValidationResult>) -> Self {
        Screening {
            verdict: Verdict::Rejected,
            validation,
            findings: Vec::new(),
        }
    }

    fn from_findings(validation: Vec<ValidationResult>, findings: Vec<DuplicateFinding>) -> Self {
        let verdict = if has_blocking(&findings) {
            Verdict::Blocked
        } else if !findings.is_empty() {
            Verdict::NeedsAcknowledgment
        } else {
            Verdict::Clear
        };
        Screening {
            verdict,
            validation,
            findings,
        }
    }

    pub fn can_persist(&self) -> bool {
        self.verdict == Verdict::Clear
    }

    pub fn summary(&self) -> String {
        let invalid = self.validation.iter().filter(|v| !v.is_valid()).count();
        format!(
            "Verdict: {:?}, invalid fields: {}, duplicate findings: {}",
            self.verdict,
            invalid,
            self.findings.len()
        )
    }
}

pub struct Screener {
    detector: DuplicateDetector,
}

impl Screener {
    pub fn new(detector: DuplicateDetector) -> Self {
        Screener { detector }
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn screen_provider(
        &self,
        candidate: &ProviderCandidate,
        existing: &[ExistingProvider],
        exclude_id: Option<RecordId>,
    ) -> Screening {
        let validation = validate_provider(candidate);
        if !all_valid(&validation) {
            return self.log(Screening::rejected(validation));
        }
        let findings = self.detector.check_provider(candidate, existing, exclude_id);
        self.log(Screening::from_findings(validation, findings))
    }

    /// `today` anchors the date-of-birth check
    pub fn screen_patient(
        &self,
        candidate: &PatientCandidate,
        existing: &[ExistingPatient],
        today: NaiveDate,
        exclude_id: Option<RecordId>,
    ) -> Screening {
        let validation = validate_patient(candidate, today, self.detector.config().max_age_years);
        if !all_valid(&validation) {
            return self.log(Screening::rejected(validation));
        }
        let findings = self.detector.check_patient(candidate, existing, exclude_id);
        self.log(Screening::from_findings(validation, findings))
    }

    pub fn screen_order(
        &self,
        candidate: &OrderCandidate,
        existing: &[ExistingOrder],
        exclude_id: Option<RecordId>,
    ) -> Screening {
        let validation = validate_order(candidate);
        if !all_valid(&validation) {
            return self.log(Screening::rejected(validation));
        }
        let findings = self.detector.check_order(candidate, existing, exclude_id);
        self.log(Screening::from_findings(validation, findings))
    }

    /// Screen any candidate; errors only when the snapshot kind does not fit the candidate
    pub fn screen(
        &self,
        candidate: &Candidate,
        existing: &RecordSnapshot,
        today: NaiveDate,
    ) -> Result<Screening> {
        let validation = match candidate {
            Candidate::Provider(c) => validate_provider(c),
            Candidate::Patient(c) => validate_patient(c, today, self.detector.config().max_age_years),
            Candidate::Order(c) => validate_order(c),
        };

        if !all_valid(&validation) {
            return Ok(self.log(Screening::rejected(validation)));
        }

        let findings = self.detector.find_duplicates(candidate, existing)?;
        Ok(self.log(Screening::from_findings(validation, findings)))
    }

    fn log(&self, screening: Screening) -> Screening {
        tracing::info!(verdict = ?screening.verdict, "{}", screening.summary());
        screening
    }
}

impl Default for Screener {
    fn default() -> Self {
        Self::new(DuplicateDetector::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectorError;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2024, 6, 1)
    }

    fn jane_doe(mrn: &str) -> PatientCandidate {
        PatientCandidate {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            mrn: mrn.to_string(),
            dob: ymd(1980, 1, 1),
        }
    }

    fn stored_jane_doe() -> ExistingPatient {
        ExistingPatient {
            id: 1,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            mrn: "111111".to_string(),
            dob: ymd(1980, 1, 1),
        }
    }

    #[test]
    fn test_malformed_npi_is_rejected_before_detection() {
        let screener = Screener::default();
        let existing = vec![ExistingProvider {
            id: 1,
            name: "Dr. Jane Smith".to_string(),
            npi: "12345".to_string(),
        }];
        let candidate = ProviderCandidate {
            name: "Dr. Jane Smith".to_string(),
            npi: "12345".to_string(),
        };

        let screening = screener.screen_provider(&candidate, &existing, None);

        assert_eq!(screening.verdict, Verdict::Rejected);
        assert!(screening.findings.is_empty());
        assert!(!screening.can_persist());
    }

    #[test]
    fn test_duplicate_npi_is_blocked() {
        let screener = Screener::default();
        let existing = vec![ExistingProvider {
            id: 1,
            name: "Dr. Jane Smith".to_string(),
            npi: "1234567890".to_string(),
        }];
        let candidate = ProviderCandidate {
            name: "Dr. Jane Smith".to_string(),
            npi: "1234567890".to_string(),
        };

        let screening = screener.screen_provider(&candidate, &existing, None);
        assert_eq!(screening.verdict, Verdict::Blocked);
    }

    #[test]
    fn test_identity_warning_needs_acknowledgment() {
        let screener = Screener::default();
        let screening = screener.screen_patient(&jane_doe("222222"), &[stored_jane_doe()], today(), None);

        assert_eq!(screening.verdict, Verdict::NeedsAcknowledgment);
        assert_eq!(screening.findings.len(), 1);
        assert!(screening.summary().contains("duplicate findings: 1"));
    }

    #[test]
    fn test_new_patient_is_clear() {
        let screener = Screener::default();
        let screening = screener.screen_patient(&jane_doe("333333"), &[], today(), None);

        assert_eq!(screening.verdict, Verdict::Clear);
        assert!(screening.can_persist());
    }

    #[test]
    fn test_future_dob_rejected() {
        let screener = Screener::default();
        let mut candidate = jane_doe("333333");
        candidate.dob = ymd(2025, 1, 1);

        let screening = screener.screen_patient(&candidate, &[], today(), None);
        assert_eq!(screening.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_bad_icd10_rejects_order() {
        let screener = Screener::default();
        let candidate = OrderCandidate {
            patient_id: 1,
            provider_id: 1,
            diagnosis_code: "100".to_string(),
            medication_name: "IVIG".to_string(),
            created_date: today(),
        };

        let screening = screener.screen_order(&candidate, &[], None);
        assert_eq!(screening.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_generic_screen_checks_snapshot_kind() {
        let screener = Screener::default();
        let candidate = Candidate::Patient(jane_doe("222222"));

        let err = screener
            .screen(&candidate, &RecordSnapshot::Providers(Vec::new()), today())
            .unwrap_err();
        assert!(matches!(err, DetectorError::SnapshotKindMismatch { .. }));

        let ok = screener
            .screen(&candidate, &RecordSnapshot::Patients(vec![stored_jane_doe()]), today())
            .unwrap();
        assert_eq!(ok.verdict, Verdict::NeedsAcknowledgment);
    }

    #[test]
    fn test_screening_serializes_verdict() {
        let screener = Screener::default();
        let screening = screener.screen_patient(&jane_doe("333333"), &[], today(), None);
        let json = serde_json::to_value(&screening).unwrap();
        assert_eq!(json["verdict"], "clear");
    }
}
