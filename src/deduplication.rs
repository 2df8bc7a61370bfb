// 🔍 Duplicate Detector - flag providers, patients and orders already on file
// Three rule families: Provider (NPI / name), Patient (MRN / identity), Order (same day / recent)

use crate::config::DetectorConfig;
use crate::error::{self, DetectorError};
use crate::records::{
    Candidate, ExistingOrder, ExistingPatient, ExistingProvider, OrderCandidate,
    PatientCandidate, ProviderCandidate, RecordId, RecordSnapshot,
};
use crate::similarity::{normalize_person_name, NameSimilarity};
use crate::validation::{
    normalize_mrn, normalize_npi, validate_mrn, validate_npi, validate_required, ValidationResult,
};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

// ============================================================================
// CATEGORY & SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCategory {
    /// Identical NPI already on file
    ProviderNpi,

    /// Similar provider name under a different NPI
    ProviderName,

    /// Identical MRN already on file
    PatientMrn,

    /// Same name + date of birth under a different MRN
    PatientIdentity,

    /// Same patient + medication ordered on the same day
    OrderSameDay,

    /// Same patient + medication ordered within the look-back window
    OrderRecent,
}

/// Ordered least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    WarnMedium,
    WarnHigh,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    Provider,
    Patient,
    Order,
}

// ============================================================================
// RULE PRIORITY TABLE
// ============================================================================
// Within a family only the highest-priority matching rules are reported.
// Rules sharing a priority are reported side by side.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateRule {
    pub category: DuplicateCategory,
    pub family: RuleFamily,
    pub severity: Severity,
    pub priority: u8,
}

pub const DUPLICATE_RULES: &[DuplicateRule] = &[
    DuplicateRule {
        category: DuplicateCategory::ProviderNpi,
        family: RuleFamily::Provider,
        severity: Severity::Block,
        priority: 10,
    },
    DuplicateRule {
        category: DuplicateCategory::ProviderName,
        family: RuleFamily::Provider,
        severity: Severity::WarnMedium,
        priority: 1,
    },
    DuplicateRule {
        category: DuplicateCategory::PatientMrn,
        family: RuleFamily::Patient,
        severity: Severity::Block,
        priority: 10,
    },
    DuplicateRule {
        category: DuplicateCategory::PatientIdentity,
        family: RuleFamily::Patient,
        severity: Severity::WarnMedium,
        priority: 1,
    },
    DuplicateRule {
        category: DuplicateCategory::OrderSameDay,
        family: RuleFamily::Order,
        severity: Severity::WarnHigh,
        priority: 10,
    },
    DuplicateRule {
        category: DuplicateCategory::OrderRecent,
        family: RuleFamily::Order,
        severity: Severity::WarnMedium,
        priority: 1,
    },
];

pub fn rule_for(category: DuplicateCategory) -> &'static DuplicateRule {
    DUPLICATE_RULES
        .iter()
        .find(|r| r.category == category)
        .unwrap_or_else(|| unreachable!("every category has a rule: {:?}", category))
}

/// Drop findings outranked by a higher-priority finding of the same family,
/// then order the survivors by category.
pub fn apply_precedence(findings: Vec<DuplicateFinding>) -> Vec<DuplicateFinding> {
    let top_priority = |family: RuleFamily| {
        findings
            .iter()
            .map(|f| rule_for(f.category))
            .filter(|r| r.family == family)
            .map(|r| r.priority)
            .max()
    };

    let mut kept: Vec<DuplicateFinding> = findings
        .iter()
        .filter(|f| {
            let rule = rule_for(f.category);
            top_priority(rule.family) == Some(rule.priority)
        })
        .cloned()
        .collect();

    kept.sort_by_key(|f| f.category);
    kept
}

// ============================================================================
// DUPLICATE FINDING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateFinding {
    pub category: DuplicateCategory,
    pub severity: Severity,

    /// Id of the stored record that triggered the finding
    pub matched_record_id: RecordId,

    /// Human-readable explanation for staff
    pub message: String,

    /// Short description of the matched record, e.g. "Dr. Jane Smith (NPI 1234567890)"
    pub matched_summary: String,
}

impl DuplicateFinding {
    fn new(
        category: DuplicateCategory,
        matched_record_id: RecordId,
        message: String,
        matched_summary: String,
    ) -> Self {
        DuplicateFinding {
            category,
            severity: rule_for(category).severity,
            matched_record_id,
            message,
            matched_summary,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Block
    }

    pub fn is_high_severity(&self) -> bool {
        self.severity >= Severity::WarnHigh
    }
}

pub fn has_blocking(findings: &[DuplicateFinding]) -> bool {
    findings.iter().any(DuplicateFinding::is_blocking)
}

pub fn highest_severity(findings: &[DuplicateFinding]) -> Option<Severity> {
    findings.iter().map(|f| f.severity).max()
}

// ============================================================================
// DUPLICATE DETECTOR
// ============================================================================

pub struct DuplicateDetector {
    config: DetectorConfig,
    similarity: Box<dyn NameSimilarity>,
}

impl DuplicateDetector {
    /// Create detector with default thresholds
    pub fn new() -> Self {
        let config = DetectorConfig::default();
        let similarity = config.name_similarity.build();
        DuplicateDetector { config, similarity }
    }

    /// Create detector from custom thresholds; rejects a config that would disable a rule
    pub fn with_config(config: DetectorConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let similarity = config.name_similarity.build();
        Ok(DuplicateDetector { config, similarity })
    }

    /// Replace the provider-name scoring function
    pub fn with_similarity(mut self, similarity: Box<dyn NameSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Screen any candidate against a snapshot of the same kind
    pub fn find_duplicates(
        &self,
        candidate: &Candidate,
        existing: &RecordSnapshot,
    ) -> error::Result<Vec<DuplicateFinding>> {
        self.find_duplicates_excluding(candidate, existing, None)
    }

    /// Same as `find_duplicates`, ignoring the stored record being edited
    pub fn find_duplicates_excluding(
        &self,
        candidate: &Candidate,
        existing: &RecordSnapshot,
        exclude_id: Option<RecordId>,
    ) -> error::Result<Vec<DuplicateFinding>> {
        match (candidate, existing) {
            (Candidate::Provider(c), RecordSnapshot::Providers(records)) => {
                ensure_well_formed(validate_npi(&normalize_npi(&c.npi)))?;
                Ok(self.check_provider(c, records, exclude_id))
            }
            (Candidate::Patient(c), RecordSnapshot::Patients(records)) => {
                ensure_well_formed(validate_mrn(&normalize_mrn(&c.mrn)))?;
                Ok(self.check_patient(c, records, exclude_id))
            }
            (Candidate::Order(c), RecordSnapshot::Orders(records)) => {
                ensure_well_formed(validate_required("medication_name", Some(c.medication_name.as_str())))?;
                Ok(self.check_order(c, records, exclude_id))
            }
            _ => Err(DetectorError::SnapshotKindMismatch {
                candidate: candidate.kind(),
                snapshot: existing.kind(),
            }),
        }
    }

    // ========================================================================
    // PROVIDER RULES
    // ========================================================================

    pub fn check_provider(
        &self,
        candidate: &ProviderCandidate,
        existing: &[ExistingProvider],
        exclude_id: Option<RecordId>,
    ) -> Vec<DuplicateFinding> {
        let records: Vec<&ExistingProvider> =
            existing.iter().filter(|p| Some(p.id) != exclude_id).collect();
        let npi = normalize_npi(&candidate.npi);

        let findings = [
            self.provider_npi_match(&npi, &records),
            self.provider_name_match(&candidate.name, &npi, &records),
        ];
        self.finish("provider", findings)
    }

    /// Rule: identical NPI -> Block
    fn provider_npi_match(&self, npi: &str, records: &[&ExistingProvider]) -> Option<DuplicateFinding> {
        let matched = records
            .iter()
            .filter(|p| p.npi.trim() == npi)
            .min_by_key(|p| p.id)?;

        Some(DuplicateFinding::new(
            DuplicateCategory::ProviderNpi,
            matched.id,
            format!("Provider with NPI {} already exists: {}", npi, matched.name),
            provider_summary(matched),
        ))
    }

    /// Rule: similar name, different NPI -> Warn (medium).
    /// Exact normalized matches beat fuzzy ones, then the higher score, then the lower id.
    fn provider_name_match(
        &self,
        name: &str,
        npi: &str,
        records: &[&ExistingProvider],
    ) -> Option<DuplicateFinding> {
        let wanted = normalize_person_name(name, &self.config.honorifics);
        if wanted.is_empty() {
            return None;
        }

        let (matched, score) = records
            .iter()
            .filter(|p| p.npi.trim() != npi)
            .filter_map(|p| {
                let theirs = normalize_person_name(&p.name, &self.config.honorifics);
                if theirs.is_empty() {
                    return None;
                }
                let exact = theirs == wanted;
                let score = if exact {
                    1.0
                } else {
                    self.similarity.score(&wanted, &theirs)
                };
                (exact || score >= self.config.name_similarity_threshold)
                    .then_some((*p, exact, score))
            })
            .max_by(|a, b| {
                a.1.cmp(&b.1)
                    .then(a.2.total_cmp(&b.2))
                    .then(Reverse(a.0.id).cmp(&Reverse(b.0.id)))
            })
            .map(|(p, _, score)| (p, score))?;

        tracing::debug!(
            matched_id = matched.id,
            score,
            scorer = self.similarity.name(),
            "Provider name match"
        );

        Some(DuplicateFinding::new(
            DuplicateCategory::ProviderName,
            matched.id,
            format!(
                "Similar provider name exists with a different NPI: {} (NPI {}). Please verify this is correct.",
                matched.name, matched.npi
            ),
            provider_summary(matched),
        ))
    }

    // ========================================================================
    // PATIENT RULES
    // ========================================================================

    pub fn check_patient(
        &self,
        candidate: &PatientCandidate,
        existing: &[ExistingPatient],
        exclude_id: Option<RecordId>,
    ) -> Vec<DuplicateFinding> {
        let records: Vec<&ExistingPatient> =
            existing.iter().filter(|p| Some(p.id) != exclude_id).collect();
        let mrn = normalize_mrn(&candidate.mrn);

        let findings = [
            self.patient_mrn_match(&mrn, &records),
            self.patient_identity_match(candidate, &mrn, &records),
        ];
        self.finish("patient", findings)
    }

    /// Rule: identical MRN -> Block
    fn patient_mrn_match(&self, mrn: &str, records: &[&ExistingPatient]) -> Option<DuplicateFinding> {
        let matched = records
            .iter()
            .filter(|p| p.mrn.trim() == mrn)
            .min_by_key(|p| p.id)?;

        Some(DuplicateFinding::new(
            DuplicateCategory::PatientMrn,
            matched.id,
            format!(
                "Patient with MRN {} already exists as {} (DOB: {})",
                mrn,
                matched.full_name(),
                matched.dob
            ),
            patient_summary(matched),
        ))
    }

    /// Rule: same normalized full name + same DOB, different MRN -> Warn (medium)
    fn patient_identity_match(
        &self,
        candidate: &PatientCandidate,
        mrn: &str,
        records: &[&ExistingPatient],
    ) -> Option<DuplicateFinding> {
        let no_honorifics: &[&str] = &[];
        let wanted = normalize_person_name(&candidate.full_name(), no_honorifics);
        if wanted.is_empty() {
            return None;
        }

        let matched = records
            .iter()
            .filter(|p| p.mrn.trim() != mrn && p.dob == candidate.dob)
            .filter(|p| normalize_person_name(&p.full_name(), no_honorifics) == wanted)
            .min_by_key(|p| p.id)?;

        Some(DuplicateFinding::new(
            DuplicateCategory::PatientIdentity,
            matched.id,
            format!(
                "Patient with same name and date of birth exists with MRN {}. Is this a duplicate?",
                matched.mrn
            ),
            patient_summary(matched),
        ))
    }

    // ========================================================================
    // ORDER RULES
    // ========================================================================

    pub fn check_order(
        &self,
        candidate: &OrderCandidate,
        existing: &[ExistingOrder],
        exclude_id: Option<RecordId>,
    ) -> Vec<DuplicateFinding> {
        let medication = normalize_medication(&candidate.medication_name);

        // (order, days before the candidate's date)
        let history: Vec<(&ExistingOrder, i64)> = existing
            .iter()
            .filter(|o| Some(o.id) != exclude_id)
            .filter(|o| o.patient_id == candidate.patient_id)
            .filter(|o| normalize_medication(&o.medication_name) == medication)
            .map(|o| (o, (candidate.created_date - o.created_date).num_days()))
            .collect();

        let findings = [
            self.order_same_day_match(candidate, &history),
            self.order_recent_match(candidate, &history),
        ];
        self.finish("order", findings)
    }

    /// Rule: same calendar day -> Warn (high)
    fn order_same_day_match(
        &self,
        candidate: &OrderCandidate,
        history: &[(&ExistingOrder, i64)],
    ) -> Option<DuplicateFinding> {
        let (matched, _) = history
            .iter()
            .filter(|(_, days)| *days == 0)
            .min_by_key(|(o, _)| o.id)?;

        Some(DuplicateFinding::new(
            DuplicateCategory::OrderSameDay,
            matched.id,
            format!(
                "DUPLICATE ALERT: An order for {} was already created for this patient on {}. This is likely a duplicate order.",
                candidate.medication_name.trim(),
                matched.created_date
            ),
            order_summary(matched),
        ))
    }

    /// Rule: 1..=window days earlier -> Warn (medium). Nearest in time wins.
    fn order_recent_match(
        &self,
        candidate: &OrderCandidate,
        history: &[(&ExistingOrder, i64)],
    ) -> Option<DuplicateFinding> {
        let window = 1..=self.config.order_window_days;
        let (matched, days) = history
            .iter()
            .filter(|(_, days)| window.contains(days))
            .min_by_key(|(o, days)| (*days, o.id))?;

        Some(DuplicateFinding::new(
            DuplicateCategory::OrderRecent,
            matched.id,
            format!(
                "An order for {} was created for this patient on {} ({} days earlier). Is this a duplicate?",
                candidate.medication_name.trim(),
                matched.created_date,
                days
            ),
            order_summary(matched),
        ))
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn finish<const N: usize>(
        &self,
        family: &str,
        findings: [Option<DuplicateFinding>; N],
    ) -> Vec<DuplicateFinding> {
        let findings = apply_precedence(findings.into_iter().flatten().collect());

        for finding in &findings {
            if finding.is_blocking() {
                tracing::warn!(
                    category = ?finding.category,
                    matched_id = finding.matched_record_id,
                    "Blocking {} duplicate",
                    family
                );
            } else {
                tracing::debug!(
                    category = ?finding.category,
                    severity = ?finding.severity,
                    matched_id = finding.matched_record_id,
                    "Advisory {} duplicate",
                    family
                );
            }
        }

        findings
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_well_formed(result: ValidationResult) -> error::Result<()> {
    if result.is_valid() {
        return Ok(());
    }
    Err(DetectorError::MalformedIdentifier {
        field: result.field,
        reason: result.reason.unwrap_or_default(),
    })
}

/// "  Drug   X " -> "drug x"
fn normalize_medication(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn provider_summary(p: &ExistingProvider) -> String {
    format!("{} (NPI {})", p.name, p.npi)
}

fn patient_summary(p: &ExistingPatient) -> String {
    format!("{} (MRN {})", p.full_name(), p.mrn)
}

fn order_summary(o: &ExistingOrder) -> String {
    if o.status.is_empty() {
        format!("{} on {}", o.medication_name, o.created_date)
    } else {
        format!("{} on {} [{}]", o.medication_name, o.created_date, o.status)
    }
}

// ============================================================================
// TESTS
// ============================================================================
