#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use server::auth_token::AuthTokenService;
use server::config::KeyConfig;
use server::db::Repositories;
use server::session::SessionManager;
use server::state::{AppState, InvestigatorPublicKey};

pub const PUBLIC_KEY_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/investigator_public.pem");
pub const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/vaultvoice.toml");

pub const INVESTIGATOR: &str = "investigator";
pub const INVESTIGATOR_PASSWORD: &str = "correct-horse-battery";
pub const PASSPHRASE: &str = "amber-lantern-42";

/// Fresh in-memory state with the checked-in public key.
pub fn test_state() -> AppState {
    state_with_repos(Repositories::in_memory())
}

/// Same as `test_state`, over the given stores.
pub fn state_with_repos(repos: Repositories) -> AppState {
    let public_key = KeyConfig {
        investigator_public_key_path: PUBLIC_KEY_PATH.into(),
    }
    .load_public_key()
    .expect("test public key");

    let tokens = AuthTokenService::new(
        b"integration-test-secret-0123456789abcdef".to_vec(),
        Duration::from_secs(3600),
    )
    .expect("token service");

    AppState::new(
        repos,
        SessionManager::new(8),
        tokens,
        InvestigatorPublicKey::new(public_key),
    )
}

pub async fn seed_investigator(state: &AppState) {
    state
        .auth
        .create_investigator(INVESTIGATOR, "Dana Investigator", INVESTIGATOR_PASSWORD)
        .await
        .expect("seed investigator");
}

pub fn peer(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, last_octet], 40_000))
}

pub fn submit_body(passphrase: &str) -> serde_json::Value {
    serde_json::json!({
        "passphrase": passphrase,
        "encryptedCaseKey": "d3JhcHBlZC1jYXNlLWtleQ==",
        "report": {
            "ciphertextBase64": "ZW5jcnlwdGVkLXJlcG9ydA==",
            "nonceBase64": "AAECAwQFBgcICQoL",
            "algo": "AES-GCM"
        }
    })
}

pub fn message_body() -> serde_json::Value {
    serde_json::json!({
        "ciphertextBase64": "ZW5jcnlwdGVkLW1lc3NhZ2U=",
        "nonceBase64": "CwoJCAcGBQQDAgEA",
        "algo": "AES-GCM"
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
