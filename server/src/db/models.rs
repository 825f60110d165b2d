use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use protocol::{
    CaseStatus, CaseSummary, EncryptedBlob, MlLabel, ReportView, ThreadItemSender, ThreadItemType,
    ThreadItemView, ALGO_AES_GCM,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::Result;

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| bcrypt::hash(uuid::Uuid::new_v4().to_string(), bcrypt::DEFAULT_COST).ok())
        .as_deref()
}

/// Does the bcrypt work of a real check when the lookup found nothing, so a
/// miss costs as long as a wrong secret.
pub fn verify_against_dummy(secret: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = bcrypt::verify(secret, hash);
    }
}

/// A whistleblower report plus its follow-up credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCase {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub session_id: String,
    pub passphrase_hash: String,
    /// Case key wrapped with the investigators' public key, stored verbatim.
    pub case_key_for_investigator: String,
    pub status: CaseStatus,
    pub ml_label: MlLabel,
    pub ml_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportCase {
    pub fn new(session_id: String, passphrase: &str, case_key_for_investigator: String) -> Result<Self> {
        let passphrase_hash = bcrypt::hash(passphrase, bcrypt::DEFAULT_COST)?;
        let now = Utc::now();

        Ok(Self {
            id: None,
            session_id,
            passphrase_hash,
            case_key_for_investigator,
            status: CaseStatus::New,
            ml_label: MlLabel::Unknown,
            ml_score: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn verify_passphrase(&self, passphrase: &str) -> Result<bool> {
        Ok(bcrypt::verify(passphrase, &self.passphrase_hash)?)
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn summary(&self) -> CaseSummary {
        CaseSummary {
            id: self.id_hex(),
            session_id: self.session_id.clone(),
            created_at: self.created_at,
            status: self.status,
            ml_label: self.ml_label,
            ml_score: self.ml_score,
        }
    }
}

/// One encrypted entry on a case thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub case_id: ObjectId,
    pub item_type: ThreadItemType,
    pub ciphertext_base64: String,
    pub nonce_base64: String,
    pub algo: String,
    pub sender: ThreadItemSender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ThreadItem {
    pub fn new(
        case_id: ObjectId,
        item_type: ThreadItemType,
        blob: EncryptedBlob,
        sender: ThreadItemSender,
        filename: Option<String>,
    ) -> Self {
        let algo = if blob.algo.is_empty() {
            ALGO_AES_GCM.to_string()
        } else {
            blob.algo
        };

        Self {
            id: None,
            case_id,
            item_type,
            ciphertext_base64: blob.ciphertext_base64,
            nonce_base64: blob.nonce_base64,
            algo,
            sender,
            filename,
            created_at: Utc::now(),
        }
    }

    pub fn view(&self) -> ThreadItemView {
        ThreadItemView {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            item_type: self.item_type,
            created_at: self.created_at,
            blob: EncryptedBlob {
                ciphertext_base64: self.ciphertext_base64.clone(),
                nonce_base64: self.nonce_base64.clone(),
                algo: self.algo.clone(),
            },
            sender: self.sender,
            filename: self.filename.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investigator {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Investigator {
    pub fn new(username: String, display_name: String, password: &str) -> Result<Self> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

        Ok(Self {
            id: None,
            username,
            display_name,
            password_hash,
            created_at: Utc::now(),
            last_login: None,
        })
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        Ok(bcrypt::verify(password, &self.password_hash)?)
    }
}

/// Entity of the standalone report demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Report {
    pub fn view(&self) -> ReportView {
        ReportView {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
        }
    }
}
