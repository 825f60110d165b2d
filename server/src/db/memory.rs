//! Process-local backend for development and tests. Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;
use protocol::{CaseStatus, MlLabel};

use super::models::{Investigator, Report, ReportCase, ThreadItem};
use super::repository::{CaseStore, InvestigatorStore, ReportStore, StoreHealth, ThreadStore};
use crate::error::{Result, VaultVoiceError};

#[derive(Default)]
pub struct MemoryStore {
    cases: DashMap<ObjectId, ReportCase>,
    // session_id -> case id
    case_sessions: DashMap<String, ObjectId>,
    thread_items: DashMap<ObjectId, ThreadItem>,
    investigators: DashMap<String, Investigator>,
    reports: DashMap<ObjectId, Report>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl CaseStore for MemoryStore {
    async fn insert(&self, mut case: ReportCase) -> Result<ReportCase> {
        let id = ObjectId::new();

        match self.case_sessions.entry(case.session_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(VaultVoiceError::Conflict(
                    "Session id is already in use".to_string(),
                ));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        case.id = Some(id);
        self.cases.insert(id, case.clone());
        Ok(case)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ReportCase>> {
        Ok(self.cases.get(id).map(|case| case.clone()))
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<ReportCase>> {
        let id = match self.case_sessions.get(session_id) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.cases.get(&id).map(|case| case.clone()))
    }

    async fn list(&self, status: Option<CaseStatus>) -> Result<Vec<ReportCase>> {
        let mut cases: Vec<ReportCase> = self
            .cases
            .iter()
            .filter(|case| status.map_or(true, |status| case.status == status))
            .map(|case| case.clone())
            .collect();

        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(cases)
    }

    async fn update_status(&self, id: &ObjectId, status: CaseStatus) -> Result<bool> {
        match self.cases.get_mut(id) {
            Some(mut case) => {
                case.status = status;
                case.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_classification(
        &self,
        id: &ObjectId,
        label: MlLabel,
        score: f64,
    ) -> Result<bool> {
        match self.cases.get_mut(id) {
            Some(mut case) => {
                case.ml_label = label;
                case.ml_score = score;
                case.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.cases.len() as u64)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        match self.cases.remove(id) {
            Some((_, case)) => {
                self.case_sessions.remove(&case.session_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn insert(&self, mut item: ThreadItem) -> Result<ThreadItem> {
        let id = ObjectId::new();
        item.id = Some(id);
        self.thread_items.insert(id, item.clone());
        Ok(item)
    }

    async fn list_for_case(&self, case_id: &ObjectId) -> Result<Vec<ThreadItem>> {
        let mut items: Vec<ThreadItem> = self
            .thread_items
            .iter()
            .filter(|item| &item.case_id == case_id)
            .map(|item| item.clone())
            .collect();

        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }
}

#[async_trait]
impl InvestigatorStore for MemoryStore {
    async fn insert(&self, mut investigator: Investigator) -> Result<Investigator> {
        match self.investigators.entry(investigator.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(VaultVoiceError::Conflict(format!(
                "Username '{}' is already taken",
                investigator.username
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                investigator.id = Some(ObjectId::new());
                slot.insert(investigator.clone());
                Ok(investigator)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Investigator>> {
        Ok(self
            .investigators
            .get(username)
            .map(|investigator| investigator.clone()))
    }

    async fn update_last_login(&self, id: &ObjectId) -> Result<()> {
        for mut investigator in self.investigators.iter_mut() {
            if investigator.id.as_ref() == Some(id) {
                investigator.last_login = Some(Utc::now());
                break;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert(&self, mut report: Report) -> Result<Report> {
        let id = ObjectId::new();
        report.id = Some(id);
        self.reports.insert(id, report.clone());
        Ok(report)
    }

    async fn list(&self) -> Result<Vec<Report>> {
        let mut reports: Vec<Report> = self.reports.iter().map(|r| r.clone()).collect();
        reports.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reports)
    }
}
