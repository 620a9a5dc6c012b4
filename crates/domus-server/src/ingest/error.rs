//! Failure classification for import attempts.
//!
//! Every terminal failure of an attempt maps to exactly one category. The
//! category only drives the audit message and the API error code; all
//! categories are equally fatal to the attempt.

use thiserror::Error;

/// Stable, user-facing failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// The upload is not shaped like a JSON array of records, or an element
    /// could not be decoded at all.
    Structural,
    /// A record decoded fine but violates declared field constraints.
    Validation,
    /// A record references a house that does not exist.
    Referential,
    /// The archival store could not be reached or refused the write.
    Storage,
    /// Anything else.
    Unknown,
}

impl ImportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportErrorKind::Structural => "STRUCTURAL",
            ImportErrorKind::Validation => "VALIDATION",
            ImportErrorKind::Referential => "REFERENTIAL",
            ImportErrorKind::Storage => "STORAGE",
            ImportErrorKind::Unknown => "UNKNOWN",
        }
    }
}

/// Terminal error of one import attempt. The display string is what ends up
/// in the FAILURE audit row's error_message column.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed upload: {0}")]
    Structural(String),

    #[error("invalid record: {0}")]
    Validation(String),

    #[error("unresolved house reference: {0}")]
    Referential(String),

    #[error("archival storage failure: {0}")]
    Storage(String),

    #[error("{0}")]
    Unknown(String),
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::Structural(_) => ImportErrorKind::Structural,
            ImportError::Validation(_) => ImportErrorKind::Validation,
            ImportError::Referential(_) => ImportErrorKind::Referential,
            ImportError::Storage(_) => ImportErrorKind::Storage,
            ImportError::Unknown(_) => ImportErrorKind::Unknown,
        }
    }

    /// Prefix the message with the 1-based position of the offending record,
    /// preserving the category.
    pub fn with_ordinal(self, ordinal: usize) -> Self {
        match self {
            ImportError::Structural(m) => {
                ImportError::Structural(format!("record {}: {}", ordinal, m))
            },
            ImportError::Validation(m) => {
                ImportError::Validation(format!("record {}: {}", ordinal, m))
            },
            ImportError::Referential(m) => {
                ImportError::Referential(format!("record {}: {}", ordinal, m))
            },
            ImportError::Storage(m) => ImportError::Storage(format!("record {}: {}", ordinal, m)),
            ImportError::Unknown(m) => ImportError::Unknown(format!("record {}: {}", ordinal, m)),
        }
    }
}

impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
                return ImportError::Referential(format!(
                    "a referenced house id does not exist ({})",
                    db_err.message()
                ));
            }
        }

        ImportError::Unknown(format!("database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ImportError::Structural("x".into()).kind(),
            ImportErrorKind::Structural
        );
        assert_eq!(
            ImportError::Validation("x".into()).kind(),
            ImportErrorKind::Validation
        );
        assert_eq!(
            ImportError::Referential("x".into()).kind(),
            ImportErrorKind::Referential
        );
        assert_eq!(
            ImportError::Storage("x".into()).kind(),
            ImportErrorKind::Storage
        );
        assert_eq!(
            ImportError::Unknown("x".into()).kind(),
            ImportErrorKind::Unknown
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ImportErrorKind::Structural.as_str(), "STRUCTURAL");
        assert_eq!(ImportErrorKind::Validation.as_str(), "VALIDATION");
        assert_eq!(ImportErrorKind::Referential.as_str(), "REFERENTIAL");
        assert_eq!(ImportErrorKind::Storage.as_str(), "STORAGE");
        assert_eq!(ImportErrorKind::Unknown.as_str(), "UNKNOWN");
    }

    #[test]
    fn test_display_carries_cause() {
        let err = ImportError::Validation("area must be greater than 0".into());
        assert!(err.to_string().contains("area must be greater than 0"));
    }

    #[test]
    fn test_non_database_sqlx_error_is_unknown() {
        let err: ImportError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), ImportErrorKind::Unknown);
    }
}
