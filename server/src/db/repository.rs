//! Storage seams. Services only see these traits; `mongo` and `memory`
//! provide the two backends selectable from configuration.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use protocol::{CaseStatus, MlLabel};
use std::sync::Arc;

use super::memory::MemoryStore;
use super::models::{Investigator, Report, ReportCase, ThreadItem};
use super::mongo::MongoDbContext;
use crate::error::Result;

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Stores a new case and returns it with its id assigned.
    async fn insert(&self, case: ReportCase) -> Result<ReportCase>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ReportCase>>;

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<ReportCase>>;

    async fn session_id_exists(&self, session_id: &str) -> Result<bool> {
        Ok(self.find_by_session_id(session_id).await?.is_some())
    }

    /// Newest first, optionally restricted to one status.
    async fn list(&self, status: Option<CaseStatus>) -> Result<Vec<ReportCase>>;

    /// Returns false when no case has this id.
    async fn update_status(&self, id: &ObjectId, status: CaseStatus) -> Result<bool>;

    async fn update_classification(&self, id: &ObjectId, label: MlLabel, score: f64)
        -> Result<bool>;

    async fn count(&self) -> Result<u64>;

    /// Returns false when no case has this id.
    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}

#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn insert(&self, item: ThreadItem) -> Result<ThreadItem>;

    /// Oldest first.
    async fn list_for_case(&self, case_id: &ObjectId) -> Result<Vec<ThreadItem>>;
}

#[async_trait]
pub trait InvestigatorStore: Send + Sync {
    /// Fails with a conflict when the username is taken.
    async fn insert(&self, investigator: Investigator) -> Result<Investigator>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Investigator>>;

    async fn update_last_login(&self, id: &ObjectId) -> Result<()>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Always stores a new row, whatever id the report carries.
    async fn insert(&self, report: Report) -> Result<Report>;

    async fn list(&self) -> Result<Vec<Report>>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Handles to every store, shared as actix app data.
#[derive(Clone)]
pub struct Repositories {
    pub cases: Arc<dyn CaseStore>,
    pub threads: Arc<dyn ThreadStore>,
    pub investigators: Arc<dyn InvestigatorStore>,
    pub reports: Arc<dyn ReportStore>,
    health: Arc<dyn StoreHealth>,
}

impl Repositories {
    pub fn mongo(context: MongoDbContext) -> Self {
        Self {
            cases: Arc::new(context.cases()),
            threads: Arc::new(context.thread_items()),
            investigators: Arc::new(context.investigators()),
            reports: Arc::new(context.reports()),
            health: Arc::new(context),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            cases: store.clone(),
            threads: store.clone(),
            investigators: store.clone(),
            reports: store.clone(),
            health: store,
        }
    }

    /// Swaps the store behind `/health` pings.
    pub fn with_health(mut self, health: Arc<dyn StoreHealth>) -> Self {
        self.health = health;
        self
    }

    pub async fn ping(&self) -> Result<()> {
        self.health.ping().await
    }
}
