// 🗂️ Records - candidates submitted for intake + snapshot of stored records
// The core only ever reads these; ownership stays with the caller's store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a record in the caller's store
pub type RecordId = i64;

// ============================================================================
// CANDIDATES (not yet persisted)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCandidate {
    /// Full name as typed, e.g. "Dr. Jane Smith"
    pub name: String,

    /// National Provider Identifier - 10 digits
    pub npi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientCandidate {
    pub first_name: String,
    pub last_name: String,

    /// Medical Record Number - 6 digits
    pub mrn: String,

    pub dob: NaiveDate,
}

impl PatientCandidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCandidate {
    pub patient_id: RecordId,
    pub provider_id: RecordId,

    /// Primary ICD-10 code, e.g. "G70.00"
    pub diagnosis_code: String,

    pub medication_name: String,

    /// Calendar day the order is being created
    pub created_date: NaiveDate,
}

/// Any submission the detector can screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    Provider(ProviderCandidate),
    Patient(PatientCandidate),
    Order(OrderCandidate),
}

impl Candidate {
    pub fn kind(&self) -> &'static str {
        match self {
            Candidate::Provider(_) => "provider",
            Candidate::Patient(_) => "patient",
            Candidate::Order(_) => "order",
        }
    }
}

// ============================================================================
// EXISTING RECORDS (read-only snapshot)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingProvider {
    pub id: RecordId,
    pub name: String,
    pub npi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingPatient {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub mrn: String,
    pub dob: NaiveDate,
}

impl ExistingPatient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingOrder {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub provider_id: RecordId,
    pub medication_name: String,
    pub created_date: NaiveDate,

    /// draft / submitted / completed - informational only
    #[serde(default)]
    pub status: String,
}

/// Already-fetched records of one kind, handed to the detector by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum RecordSnapshot {
    Providers(Vec<ExistingProvider>),
    Patients(Vec<ExistingPatient>),
    Orders(Vec<ExistingOrder>),
}

impl RecordSnapshot {
    pub fn kind(&self) -> &'static str {
        match self {
            RecordSnapshot::Providers(_) => "provider",
            RecordSnapshot::Patients(_) => "patient",
            RecordSnapshot::Orders(_) => "order",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordSnapshot::Providers(records) => records.len(),
            RecordSnapshot::Patients(records) => records.len(),
            RecordSnapshot::Orders(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// LOOKUPS (auto-populate forms from a known identifier)
// ============================================================================

/// Existing provider with this NPI, if the NPI is 10 characters long
pub fn find_provider_by_npi<'a>(
    providers: &'a [ExistingProvider],
    npi: &str,
) -> Option<&'a ExistingProvider> {
    let npi = npi.trim();
    if npi.len() != 10 {
        return None;
    }
    providers.iter().find(|p| p.npi.trim() == npi)
}

/// Existing patient with this MRN, if the MRN is 6 characters long
pub fn find_patient_by_mrn<'a>(
    patients: &'a [ExistingPatient],
    mrn: &str,
) -> Option<&'a ExistingPatient> {
    let mrn = mrn.trim();
    if mrn.len() != 6 {
        return None;
    }
    patients.iter().find(|p| p.mrn.trim() == mrn)
}
