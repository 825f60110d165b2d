//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blob::{EncryptedBlob, BlobError};
use crate::model::{CaseStatus, MlLabel, ThreadItemSender, ThreadItemType};

/// Initial submission: the report plus the credentials needed to follow up.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub passphrase: String,
    /// Case key wrapped with the investigators' public key.
    #[serde(alias = "wrappedCaseKey")]
    pub encrypted_case_key: String,
    pub report: EncryptedBlob,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportResponse {
    pub session_id: String,
    pub case_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub investigator_public_key_pem: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupLoginRequest {
    pub session_id: String,
    pub passphrase: String,
}

/// Returned on a successful follow-up login.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupSession {
    pub token: String,
    pub expires_in_secs: u64,
    pub case: WhistleblowerCaseView,
}

/// What a whistleblower sees of their own case. ML data and the wrapped
/// case key are investigator-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhistleblowerCaseView {
    pub session_id: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub thread: Vec<ThreadItemView>,
}

/// Body of a reply from either side of a case.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[serde(flatten)]
    pub blob: EncryptedBlob,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl PostMessageRequest {
    #[must_use]
    pub fn message(blob: EncryptedBlob) -> Self {
        Self {
            blob,
            filename: None,
        }
    }

    #[must_use]
    pub fn item_type(&self) -> ThreadItemType {
        match self.filename.as_deref() {
            Some(name) if !name.trim().is_empty() => ThreadItemType::Attachment,
            _ => ThreadItemType::Message,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItemView {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ThreadItemType,
    pub created_at: DateTime<Utc>,
    pub blob: EncryptedBlob,
    pub sender: ThreadItemSender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Dashboard row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    pub id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub status: CaseStatus,
    pub ml_label: MlLabel,
    pub ml_score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetails {
    #[serde(flatten)]
    pub summary: CaseSummary,
    pub case_key_for_investigator: String,
    pub thread: Vec<ThreadItemView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvestigatorLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigatorLoginResponse {
    pub token: String,
    pub name: String,
    pub expires_in_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusQuery {
    pub new_status: CaseStatus,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct CaseListQuery {
    #[serde(default)]
    pub status: Option<CaseStatus>,
}

/// Externally computed classification pushed onto a case.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ClassificationUpdate {
    pub label: MlLabel,
    pub score: f64,
}

impl ClassificationUpdate {
    pub fn validate(&self) -> Result<(), BlobError> {
        if !self.score.is_finite() || !(0.0..=1.0).contains(&self.score) {
            return Err(BlobError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }
}

/// Demo report body. Unknown fields, including any client supplied `id`, are
/// ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub active_sessions: usize,
}

/// Body of every non-2xx response produced by the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}
