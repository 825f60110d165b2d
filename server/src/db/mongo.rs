use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use protocol::{CaseStatus, MlLabel};

use super::models::{Investigator, Report, ReportCase, ThreadItem};
use super::repository::{CaseStore, InvestigatorStore, ReportStore, StoreHealth, ThreadStore};
use crate::error::{Result, VaultVoiceError};

const CASES: &str = "report_cases";
const THREAD_ITEMS: &str = "thread_items";
const INVESTIGATORS: &str = "investigators";
const REPORTS: &str = "reports";

// Same textual form chrono's serde impl writes, so $set values sort alongside stored ones.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn inserted_id(result: &mongodb::results::InsertOneResult) -> Result<ObjectId> {
    result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| VaultVoiceError::Internal("Inserted document has no ObjectId".to_string()))
}

const DUPLICATE_KEY: i32 = 11000;

/// Unique index violations (E11000), raised when a concurrent insert wins.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

fn conflict_if_duplicate(err: mongodb::error::Error, message: impl Into<String>) -> VaultVoiceError {
    if is_duplicate_key(&err) {
        VaultVoiceError::Conflict(message.into())
    } else {
        err.into()
    }
}

async fn collect<T>(mut cursor: mongodb::Cursor<T>) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while let Some(item) = cursor.try_next().await? {
        items.push(item);
    }
    Ok(items)
}

#[derive(Clone)]
pub struct MongoDbContext {
    db: Database,
}

impl MongoDbContext {
    pub fn new(client: Client, database_name: &str) -> Self {
        Self {
            db: client.database(database_name),
        }
    }

    pub fn cases(&self) -> CaseRepository {
        CaseRepository {
            collection: self.db.collection(CASES),
        }
    }

    pub fn thread_items(&self) -> ThreadItemRepository {
        ThreadItemRepository {
            collection: self.db.collection(THREAD_ITEMS),
        }
    }

    pub fn investigators(&self) -> InvestigatorRepository {
        InvestigatorRepository {
            collection: self.db.collection(INVESTIGATORS),
        }
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository {
            collection: self.db.collection(REPORTS),
        }
    }

    pub async fn init_indexes(&self) -> Result<()> {
        // Follow-up logins look cases up by session id; it must be unique.
        let session_index = IndexModel::builder()
            .keys(doc! { "session_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.db
            .collection::<ReportCase>(CASES)
            .create_index(session_index)
            .await?;

        let created_index = IndexModel::builder().keys(doc! { "created_at": -1 }).build();

        self.db
            .collection::<ReportCase>(CASES)
            .create_index(created_index)
            .await?;

        let case_index = IndexModel::builder()
            .keys(doc! { "case_id": 1, "created_at": 1 })
            .build();

        self.db
            .collection::<ThreadItem>(THREAD_ITEMS)
            .create_index(case_index)
            .await?;

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.db
            .collection::<Investigator>(INVESTIGATORS)
            .create_index(username_index)
            .await?;

        log::info!("Database indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for MongoDbContext {
    async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct CaseRepository {
    collection: Collection<ReportCase>,
}

impl CaseRepository {
    async fn set_fields(&self, id: &ObjectId, mut fields: Document) -> Result<bool> {
        fields.insert("updated_at", timestamp_now());
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl CaseStore for CaseRepository {
    async fn insert(&self, mut case: ReportCase) -> Result<ReportCase> {
        case.id = None;
        let result = self
            .collection
            .insert_one(&case)
            .await
            .map_err(|err| conflict_if_duplicate(err, "Session id is already in use"))?;
        case.id = Some(inserted_id(&result)?);
        Ok(case)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ReportCase>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<ReportCase>> {
        Ok(self
            .collection
            .find_one(doc! { "session_id": session_id })
            .await?)
    }

    async fn session_id_exists(&self, session_id: &str) -> Result<bool> {
        let count = self
            .collection
            .count_documents(doc! { "session_id": session_id })
            .await?;
        Ok(count > 0)
    }

    async fn list(&self, status: Option<CaseStatus>) -> Result<Vec<ReportCase>> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .await?;

        collect(cursor).await
    }

    async fn update_status(&self, id: &ObjectId, status: CaseStatus) -> Result<bool> {
        self.set_fields(id, doc! { "status": status.as_str() }).await
    }

    async fn update_classification(
        &self,
        id: &ObjectId,
        label: MlLabel,
        score: f64,
    ) -> Result<bool> {
        self.set_fields(id, doc! { "ml_label": label.as_str(), "ml_score": score })
            .await
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[derive(Clone)]
pub struct ThreadItemRepository {
    collection: Collection<ThreadItem>,
}

#[async_trait]
impl ThreadStore for ThreadItemRepository {
    async fn insert(&self, mut item: ThreadItem) -> Result<ThreadItem> {
        item.id = None;
        let result = self.collection.insert_one(&item).await?;
        item.id = Some(inserted_id(&result)?);
        Ok(item)
    }

    async fn list_for_case(&self, case_id: &ObjectId) -> Result<Vec<ThreadItem>> {
        let cursor = self
            .collection
            .find(doc! { "case_id": case_id })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?;

        collect(cursor).await
    }
}

#[derive(Clone)]
pub struct InvestigatorRepository {
    collection: Collection<Investigator>,
}

#[async_trait]
impl InvestigatorStore for InvestigatorRepository {
    async fn insert(&self, mut investigator: Investigator) -> Result<Investigator> {
        if self.find_by_username(&investigator.username).await?.is_some() {
            return Err(VaultVoiceError::Conflict(format!(
                "Username '{}' is already taken",
                investigator.username
            )));
        }

        investigator.id = None;
        let result = self
            .collection
            .insert_one(&investigator)
            .await
            .map_err(|err| {
                conflict_if_duplicate(
                    err,
                    format!("Username '{}' is already taken", investigator.username),
                )
            })?;
        investigator.id = Some(inserted_id(&result)?);
        Ok(investigator)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Investigator>> {
        Ok(self
            .collection
            .find_one(doc! { "username": username })
            .await?)
    }

    async fn update_last_login(&self, id: &ObjectId) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_login": timestamp_now() } },
            )
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ReportRepository {
    collection: Collection<Report>,
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn insert(&self, mut report: Report) -> Result<Report> {
        report.id = None;
        let result = self.collection.insert_one(&report).await?;
        report.id = Some(inserted_id(&result)?);
        Ok(report)
    }

    async fn list(&self) -> Result<Vec<Report>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?;
        collect(cursor).await
    }
}
