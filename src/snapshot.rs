// 📂 Snapshot Loading - read existing records exported from the store as CSV
// Headers match the record field names, dates are YYYY-MM-DD.

use crate::records::{ExistingOrder, ExistingPatient, ExistingProvider, RecordSnapshot};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

fn load_records<T: DeserializeOwned>(csv_path: &Path, kind: &str) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open {} CSV file: {:?}", kind, csv_path))?;

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        // +2: header row and 1-based numbering
        let record: T = result
            .with_context(|| format!("Failed to deserialize {} record on line {}", kind, line + 2))?;
        records.push(record);
    }

    tracing::info!("Loaded {} {} records from {:?}", records.len(), kind, csv_path);
    Ok(records)
}

/// Columns: id,name,npi
pub fn load_providers(csv_path: &Path) -> Result<Vec<ExistingProvider>> {
    load_records(csv_path, "provider")
}

/// Columns: id,first_name,last_name,mrn,dob
pub fn load_patients(csv_path: &Path) -> Result<Vec<ExistingPatient>> {
    load_records(csv_path, "patient")
}

/// Columns: id,patient_id,provider_id,medication_name,created_date[,status]
pub fn load_orders(csv_path: &Path) -> Result<Vec<ExistingOrder>> {
    load_records(csv_path, "order")
}

pub fn load_snapshot(kind: &str, csv_path: &Path) -> Result<RecordSnapshot> {
    match kind {
        "provider" => Ok(RecordSnapshot::Providers(load_providers(csv_path)?)),
        "patient" => Ok(RecordSnapshot::Patients(load_patients(csv_path)?)),
        "order" => Ok(RecordSnapshot::Orders(load_orders(csv_path)?)),
        other => anyhow::bail!("Unknown record kind: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_providers() {
        let file = write_csv("id,name,npi\n1,Dr. Jane Smith,1234567890\n2,Dr. John Doe,0987654321\n");
        let providers = load_providers(file.path()).unwrap();

        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].name, "Dr. Jane Smith");
        // Leading zero survives because npi is read as text
        assert_eq!(providers[1].npi, "0987654321");
    }

    #[test]
    fn test_load_patients_parses_dates() {
        let file = write_csv("id,first_name,last_name,mrn,dob\n7,Jane,Doe,111111,1980-01-01\n");
        let patients = load_patients(file.path()).unwrap();

        assert_eq!(patients[0].id, 7);
        assert_eq!(patients[0].dob, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
    }

    #[test]
    fn test_load_orders_status_optional() {
        let file = write_csv(
            "id,patient_id,provider_id,medication_name,created_date\n3,7,1,IVIG,2024-01-10\n",
        );
        let orders = load_orders(file.path()).unwrap();

        assert_eq!(orders[0].medication_name, "IVIG");
        assert_eq!(orders[0].status, "");
    }

    #[test]
    fn test_bad_row_reports_line() {
        let file = write_csv("id,first_name,last_name,mrn,dob\n7,Jane,Doe,111111,01/01/1980\n");
        let err = load_patients(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_snapshot_by_kind() {
        let file = write_csv("id,name,npi\n1,Dr. Jane Smith,1234567890\n");
        let snapshot = load_snapshot("provider", file.path()).unwrap();
        assert_eq!(snapshot.kind(), "provider");
        assert_eq!(snapshot.len(), 1);

        assert!(load_snapshot("invoice", file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_providers(Path::new("/nonexistent/providers.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open provider CSV file"));
    }
}
