//! JSON API contract shared between the Vault Voice server and its clients.
//!
//! Every type here maps one-to-one onto a request or response body of the
//! HTTP API. Payloads of thread items are opaque ciphertext: this crate only
//! checks that they are well-formed, never what they contain.

pub mod blob;
pub mod dto;
pub mod model;

pub use blob::{AES_GCM_NONCE_LEN, ALGO_AES_GCM, BlobError, EncryptedBlob};
pub use dto::{
    CaseDetails, CaseListQuery, CaseSummary, ClassificationUpdate, ErrorBody, FollowupLoginRequest,
    FollowupSession, HealthResponse, InvestigatorLoginRequest, InvestigatorLoginResponse,
    LogoutResponse, PostMessageRequest, PublicKeyResponse, ReportInput, ReportView,
    SubmitReportRequest, SubmitReportResponse, ThreadItemView, UpdateStatusQuery,
    WhistleblowerCaseView,
};
pub use model::{CaseStatus, MlLabel, ThreadItemSender, ThreadItemType};

/// Returns the API contract crate version string.
pub fn api_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
