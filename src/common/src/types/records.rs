use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalised view of a failed request or runtime error.
///
/// Every field carries either a real value or a sentinel; `stack` and `name`
/// are only set when the record came from a runtime error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub timestamp: String,
    pub error_code: String,
    pub message: String,
    pub url: String,
    pub method: String,
    pub status: String,
    pub response_data: Value,
    pub is_request_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ErrorRecord {
    /// Signature used to suppress repeated alerts.
    pub(crate) fn dedup_key(&self) -> String {
        format!("{}-{}-{}", self.error_code, self.url, self.method)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_request_error {
            write!(
                f,
                "{} {} {} failed ({}): {}",
                self.error_code,
                self.method.to_uppercase(),
                self.url,
                self.status,
                self.message
            )
        } else {
            write!(f, "{}: {}", self.error_code, self.message)
        }
    }
}

impl std::error::Error for ErrorRecord {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessRecord {
    pub timestamp: String,
    pub status: u16,
    pub url: String,
    pub method: String,
    pub response_data: Value,
}

/// Anything the stats endpoint accepts as `details`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UsageRecord {
    Success(SuccessRecord),
    Error(ErrorRecord),
}

impl From<SuccessRecord> for UsageRecord {
    fn from(record: SuccessRecord) -> Self {
        UsageRecord::Success(record)
    }
}

impl From<ErrorRecord> for UsageRecord {
    fn from(record: ErrorRecord) -> Self {
        UsageRecord::Error(record)
    }
}
