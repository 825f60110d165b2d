use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use protocol::{BlobError, ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum VaultVoiceError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session not found or expired")]
    InvalidSession,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Internal server error")]
    Internal(String),
}

impl From<BlobError> for VaultVoiceError {
    fn from(err: BlobError) -> Self {
        VaultVoiceError::Validation(err.to_string())
    }
}

impl ResponseError for VaultVoiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            VaultVoiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            VaultVoiceError::InvalidSession => StatusCode::UNAUTHORIZED,
            VaultVoiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            VaultVoiceError::Forbidden => StatusCode::FORBIDDEN,
            VaultVoiceError::Validation(_) => StatusCode::BAD_REQUEST,
            VaultVoiceError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultVoiceError::Conflict(_) => StatusCode::CONFLICT,
            VaultVoiceError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            VaultVoiceError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            VaultVoiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VaultVoiceError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VaultVoiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VaultVoiceError::Serialization(_) => StatusCode::BAD_REQUEST,
            VaultVoiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Driver and hashing errors can carry connection strings; keep them in the log.
        let message = match self {
            VaultVoiceError::Database(err) => {
                log::error!("Database error: {}", err);
                "Internal server error".to_string()
            }
            VaultVoiceError::PasswordHash(err) => {
                log::error!("Password hashing error: {}", err);
                "Internal server error".to_string()
            }
            VaultVoiceError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                self.to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: message,
        })
    }
}

pub type Result<T> = std::result::Result<T, VaultVoiceError>;
