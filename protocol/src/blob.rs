//! Encrypted payloads exchanged on case threads.
//!
//! The server never holds the keys for these blobs. Validation is limited to
//! shape: base64 that decodes, a nonce of the size AES-GCM expects and a
//! supported algorithm tag.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Algorithm tag clients use for thread payloads.
pub const ALGO_AES_GCM: &str = "AES-GCM";

/// AES-GCM nonce size in bytes.
pub const AES_GCM_NONCE_LEN: usize = 12;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error("ciphertext is empty")]
    EmptyCiphertext,

    #[error("ciphertext is not valid base64")]
    InvalidCiphertext,

    #[error("nonce is not valid base64")]
    InvalidNonce,

    #[error("nonce must be {AES_GCM_NONCE_LEN} bytes, got {0}")]
    NonceLength(usize),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("score must be between 0 and 1, got {0}")]
    ScoreOutOfRange(f64),
}

fn default_algo() -> String {
    ALGO_AES_GCM.to_string()
}

/// Ciphertext and nonce, both standard base64, plus the algorithm tag.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedBlob {
    pub ciphertext_base64: String,
    pub nonce_base64: String,
    #[serde(default = "default_algo")]
    pub algo: String,
}

impl EncryptedBlob {
    #[must_use]
    pub fn aes_gcm(ciphertext_base64: impl Into<String>, nonce_base64: impl Into<String>) -> Self {
        Self {
            ciphertext_base64: ciphertext_base64.into(),
            nonce_base64: nonce_base64.into(),
            algo: default_algo(),
        }
    }

    pub fn validate(&self) -> Result<(), BlobError> {
        if self.algo != ALGO_AES_GCM {
            return Err(BlobError::UnsupportedAlgorithm(self.algo.clone()));
        }

        if self.ciphertext_base64.is_empty() {
            return Err(BlobError::EmptyCiphertext);
        }
        let ciphertext = STANDARD
            .decode(&self.ciphertext_base64)
            .map_err(|_| BlobError::InvalidCiphertext)?;
        if ciphertext.is_empty() {
            return Err(BlobError::EmptyCiphertext);
        }

        let nonce = STANDARD
            .decode(&self.nonce_base64)
            .map_err(|_| BlobError::InvalidNonce)?;
        if nonce.len() != AES_GCM_NONCE_LEN {
            return Err(BlobError::NonceLength(nonce.len()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonce() -> String {
        STANDARD.encode([7u8; AES_GCM_NONCE_LEN])
    }

    #[test]
    fn accepts_well_formed_blob() {
        let blob = EncryptedBlob::aes_gcm(STANDARD.encode(b"opaque bytes"), nonce());
        assert_eq!(blob.validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_ciphertext() {
        let blob = EncryptedBlob::aes_gcm("", nonce());
        assert_eq!(blob.validate(), Err(BlobError::EmptyCiphertext));
    }

    #[test]
    fn rejects_bad_base64() {
        let blob = EncryptedBlob::aes_gcm("not*base64!", nonce());
        assert_eq!(blob.validate(), Err(BlobError::InvalidCiphertext));

        let blob = EncryptedBlob::aes_gcm(STANDARD.encode(b"x"), "%%%");
        assert_eq!(blob.validate(), Err(BlobError::InvalidNonce));
    }

    #[test]
    fn rejects_short_nonce() {
        let blob = EncryptedBlob::aes_gcm(STANDARD.encode(b"x"), STANDARD.encode([1u8; 8]));
        assert_eq!(blob.validate(), Err(BlobError::NonceLength(8)));
    }

    #[test]
    fn rejects_other_algorithms() {
        let mut blob = EncryptedBlob::aes_gcm(STANDARD.encode(b"x"), nonce());
        blob.algo = "ChaCha20-Poly1305".to_string();
        assert_eq!(
            blob.validate(),
            Err(BlobError::UnsupportedAlgorithm(
                "ChaCha20-Poly1305".to_string()
            ))
        );
    }
}
