use mongodb::bson::oid::ObjectId;
use protocol::{
    CaseDetails, CaseStatus, CaseSummary, ClassificationUpdate, PostMessageRequest,
    ThreadItemSender, ThreadItemView,
};

use crate::db::{ReportCase, Repositories, ThreadItem};
use crate::error::{Result, VaultVoiceError};

/// Malformed ids are reported the same way as unknown ones.
pub fn parse_case_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw.trim()).map_err(|_| VaultVoiceError::NotFound("Case"))
}

#[derive(Clone)]
pub struct CaseService {
    repos: Repositories,
}

impl CaseService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn find_all_case_summaries(
        &self,
        status: Option<CaseStatus>,
    ) -> Result<Vec<CaseSummary>> {
        let cases = self.repos.cases.list(status).await?;
        Ok(cases.iter().map(ReportCase::summary).collect())
    }

    pub async fn find_case(&self, case_id: &str) -> Result<ReportCase> {
        let id = parse_case_id(case_id)?;
        self.repos
            .cases
            .find_by_id(&id)
            .await?
            .ok_or(VaultVoiceError::NotFound("Case"))
    }

    pub async fn case_details(&self, case_id: &str) -> Result<CaseDetails> {
        let case = self.find_case(case_id).await?;
        let thread = self.thread(&case).await?;

        Ok(CaseDetails {
            summary: case.summary(),
            case_key_for_investigator: case.case_key_for_investigator,
            thread,
        })
    }

    pub async fn thread(&self, case: &ReportCase) -> Result<Vec<ThreadItemView>> {
        let Some(case_id) = case.id else {
            return Ok(Vec::new());
        };
        let items = self.repos.threads.list_for_case(&case_id).await?;
        Ok(items.iter().map(ThreadItem::view).collect())
    }

    pub async fn update_status(&self, case_id: &str, status: CaseStatus) -> Result<CaseSummary> {
        let id = parse_case_id(case_id)?;
        if !self.repos.cases.update_status(&id, status).await? {
            return Err(VaultVoiceError::NotFound("Case"));
        }

        log::info!("Case {} moved to {}", id.to_hex(), status.as_str());
        self.find_case(case_id).await.map(|case| case.summary())
    }

    pub async fn update_classification(
        &self,
        case_id: &str,
        update: ClassificationUpdate,
    ) -> Result<CaseSummary> {
        update.validate()?;
        let id = parse_case_id(case_id)?;
        if !self
            .repos
            .cases
            .update_classification(&id, update.label, update.score)
            .await?
        {
            return Err(VaultVoiceError::NotFound("Case"));
        }

        log::info!(
            "Case {} classified as {} ({:.3})",
            id.to_hex(),
            update.label.as_str(),
            update.score
        );
        self.find_case(case_id).await.map(|case| case.summary())
    }

    /// Appends a reply to a case thread. Closed cases are read-only.
    pub async fn save_new_thread_item(
        &self,
        case: &ReportCase,
        post: PostMessageRequest,
        sender: ThreadItemSender,
    ) -> Result<ThreadItemView> {
        post.blob.validate()?;

        let case_id = case.id.ok_or(VaultVoiceError::NotFound("Case"))?;
        if !case.status.accepts_messages() {
            return Err(VaultVoiceError::Conflict(
                "Case is closed and no longer accepts messages".to_string(),
            ));
        }

        let item_type = post.item_type();
        let filename = post
            .filename
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let item = ThreadItem::new(case_id, item_type, post.blob, sender, filename);
        let item = self.repos.threads.insert(item).await?;

        log::info!("Added {:?} item from {:?} to case {}", item_type, sender, case_id.to_hex());

        Ok(item.view())
    }
}
