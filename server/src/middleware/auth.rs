use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
    middleware::Next,
    web, HttpMessage,
};

use crate::auth_token::{bearer_token, Role};
use crate::error::VaultVoiceError;
use crate::service::{AuthContext, AuthService};

fn authorize(req: &ServiceRequest, role: Option<Role>) -> Result<AuthContext, VaultVoiceError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(VaultVoiceError::Unauthorized)?;

    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| VaultVoiceError::Internal("Auth service not available".to_string()))?;

    let context = auth.authenticate(token)?;

    if let Some(role) = role {
        if context.principal.role != role {
            log::warn!(
                "Rejected {:?} token on {:?} route {}",
                context.principal.role,
                role,
                req.match_pattern().unwrap_or_default()
            );
            return Err(VaultVoiceError::Forbidden);
        }
    }

    Ok(context)
}

async fn require(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
    role: Option<Role>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let context = authorize(&req, role)?;

    // Handlers read it back through `web::ReqData<AuthContext>`.
    req.extensions_mut().insert(context);

    next.call(req).await
}

pub async fn investigator_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    require(req, next, Some(Role::Investigator)).await
}

pub async fn whistleblower_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    require(req, next, Some(Role::Whistleblower)).await
}

/// Accepts a live token of either role.
pub async fn any_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    require(req, next, None).await
}
