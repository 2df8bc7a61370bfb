// ⚠️ Contract errors - programming mistakes, never domain outcomes
// Malformed fields are ValidationResults and duplicates are DuplicateFindings;
// only a caller breaking the calling contract ends up here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Snapshot kind mismatch: {candidate} candidate checked against {snapshot} records")]
    SnapshotKindMismatch {
        candidate: &'static str,
        snapshot: &'static str,
    },

    #[error("Malformed {field} reached the duplicate detector: {reason}")]
    MalformedIdentifier { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DetectorError>;
