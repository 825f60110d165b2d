use protocol::{
    SubmitReportRequest, SubmitReportResponse, ThreadItemSender, ThreadItemType,
    WhistleblowerCaseView,
};
use uuid::Uuid;

use crate::db::{verify_against_dummy, ReportCase, Repositories, ThreadItem};
use crate::error::{Result, VaultVoiceError};

pub const MIN_PASSPHRASE_LEN: usize = 8;

const SESSION_ID_ATTEMPTS: usize = 5;

/// Follow-up session ids are 32 lowercase hex characters.
pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(VaultVoiceError::Validation(
            "passphrase must not be blank".to_string(),
        ));
    }
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(VaultVoiceError::Validation(format!(
            "passphrase must be at least {} characters",
            MIN_PASSPHRASE_LEN
        )));
    }
    Ok(())
}

/// Intake and follow-up access for whistleblowers.
#[derive(Clone)]
pub struct WhistleblowerService {
    repos: Repositories,
}

impl WhistleblowerService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn submit_new_report(
        &self,
        request: SubmitReportRequest,
    ) -> Result<SubmitReportResponse> {
        validate_passphrase(&request.passphrase)?;
        if request.encrypted_case_key.trim().is_empty() {
            return Err(VaultVoiceError::Validation(
                "encryptedCaseKey must not be blank".to_string(),
            ));
        }
        request.report.validate()?;

        let session_id = self.unique_session_id().await?;
        let case = ReportCase::new(
            session_id,
            &request.passphrase,
            request.encrypted_case_key,
        )?;
        let case = self.repos.cases.insert(case).await?;
        let case_id = case
            .id
            .ok_or_else(|| VaultVoiceError::Internal("Stored case has no id".to_string()))?;

        let report = ThreadItem::new(
            case_id,
            ThreadItemType::Report,
            request.report,
            ThreadItemSender::Whistleblower,
            None,
        );
        if let Err(err) = self.repos.threads.insert(report).await {
            // A case without its report is unusable; drop it so the submit can be retried.
            log::error!("Storing report of case {} failed, removing case", case_id.to_hex());
            if let Err(cleanup) = self.repos.cases.delete(&case_id).await {
                log::error!("Failed to remove case {}: {}", case_id.to_hex(), cleanup);
            }
            return Err(err);
        }

        log::info!("New case {} submitted", case_id.to_hex());

        Ok(SubmitReportResponse {
            session_id: case.session_id,
            case_id: case_id.to_hex(),
            created_at: case.created_at,
        })
    }

    async fn unique_session_id(&self) -> Result<String> {
        for _ in 0..SESSION_ID_ATTEMPTS {
            let candidate = generate_session_id();
            if !self.repos.cases.session_id_exists(&candidate).await? {
                return Ok(candidate);
            }
            log::warn!("Generated session id collided with an existing case, retrying");
        }

        Err(VaultVoiceError::Internal(
            "Could not allocate a unique session id".to_string(),
        ))
    }

    /// Unknown session ids and wrong passphrases get the same error and the
    /// same bcrypt cost.
    pub async fn verify_followup(&self, session_id: &str, passphrase: &str) -> Result<ReportCase> {
        let session_id = session_id.trim();
        if session_id.is_empty() || passphrase.is_empty() {
            return Err(VaultVoiceError::InvalidCredentials);
        }

        let Some(case) = self.repos.cases.find_by_session_id(session_id).await? else {
            verify_against_dummy(passphrase);
            return Err(VaultVoiceError::InvalidCredentials);
        };

        if !case.verify_passphrase(passphrase)? {
            log::warn!("Failed follow-up login for case {}", case.id_hex());
            return Err(VaultVoiceError::InvalidCredentials);
        }

        Ok(case)
    }

    pub async fn find_by_session_id(&self, session_id: &str) -> Result<ReportCase> {
        self.repos
            .cases
            .find_by_session_id(session_id)
            .await?
            .ok_or(VaultVoiceError::NotFound("Case"))
    }

    pub async fn case_view(&self, case: &ReportCase) -> Result<WhistleblowerCaseView> {
        let thread = match case.id {
            Some(case_id) => self.repos.threads.list_for_case(&case_id).await?,
            None => Vec::new(),
        };

        Ok(WhistleblowerCaseView {
            session_id: case.session_id.clone(),
            status: case.status,
            created_at: case.created_at,
            thread: thread.iter().map(ThreadItem::view).collect(),
        })
    }
}
