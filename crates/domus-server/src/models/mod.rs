//! Domain models shared across features and the import pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// View classification of a flat, stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Street,
    Bad,
    Normal,
    Terrible,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Street => "STREET",
            View::Bad => "BAD",
            View::Normal => "NORMAL",
            View::Terrible => "TERRIBLE",
        }
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STREET" => Ok(View::Street),
            "BAD" => Ok(View::Bad),
            "NORMAL" => Ok(View::Normal),
            "TERRIBLE" => Ok(View::Terrible),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

/// Outcome of one import attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Success,
    Failure,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "SUCCESS",
            UploadStatus::Failure => "FAILURE",
        }
    }
}

impl std::str::FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(UploadStatus::Success),
            "FAILURE" => Ok(UploadStatus::Failure),
            other => Err(format!("unknown upload status: {}", other)),
        }
    }
}

/// The foreign-key target of imported flats.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct House {
    pub id: i64,
    pub name: String,
    pub year: i64,
    pub number_of_flats_on_floor: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Durable audit record of one import attempt. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadHistory {
    pub id: i64,
    pub file_name: String,
    pub entity_name: String,
    pub uploaded: i64,
    pub uploaded_at: DateTime<Utc>,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub uploaded_by: String,
}

/// Row type for the upload_history table (for FromRow). The status column is
/// text; conversion to [`UploadStatus`] happens in `into_history`.
#[derive(Debug, sqlx::FromRow)]
pub struct UploadHistoryRow {
    pub id: i64,
    pub file_name: String,
    pub entity_name: String,
    pub uploaded: i64,
    pub uploaded_at: DateTime<Utc>,
    pub status: String,
    pub error_message: Option<String>,
    pub uploaded_by: String,
}

impl UploadHistoryRow {
    pub fn into_history(self) -> Result<UploadHistory, sqlx::Error> {
        let status = self
            .status
            .parse::<UploadStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(UploadHistory {
            id: self.id,
            file_name: self.file_name,
            entity_name: self.entity_name,
            uploaded: self.uploaded,
            uploaded_at: self.uploaded_at,
            status,
            error_message: self.error_message,
            uploaded_by: self.uploaded_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_round_trip() {
        for v in [View::Street, View::Bad, View::Normal, View::Terrible] {
            assert_eq!(v.as_str().parse::<View>(), Ok(v));
        }
        assert!("GOOD".parse::<View>().is_err());
    }

    #[test]
    fn test_view_serde_uses_screaming_case() {
        let json = serde_json::to_string(&View::Street).unwrap();
        assert_eq!(json, "\"STREET\"");
        let parsed: View = serde_json::from_str("\"TERRIBLE\"").unwrap();
        assert_eq!(parsed, View::Terrible);
    }

    #[test]
    fn test_upload_status_round_trip() {
        assert_eq!("SUCCESS".parse::<UploadStatus>(), Ok(UploadStatus::Success));
        assert_eq!("FAILURE".parse::<UploadStatus>(), Ok(UploadStatus::Failure));
        assert!("PENDING".parse::<UploadStatus>().is_err());
    }
}
