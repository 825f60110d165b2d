use actix_web::{web, HttpResponse};
use protocol::{FollowupLoginRequest, PostMessageRequest, ThreadItemSender};

use crate::{
    db::ReportCase,
    error::{Result, VaultVoiceError},
    service::{AuthContext, AuthService, CaseService, WhistleblowerService},
};

pub async fn followup_login(
    req: web::Json<FollowupLoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let session = auth.followup_login(&req.session_id, &req.passphrase).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// Resolves the path's follow-up session id and checks the token was issued
/// for that case. Unknown ids look the same as someone else's case.
async fn owned_case(
    service: &WhistleblowerService,
    context: &AuthContext,
    session_id: &str,
) -> Result<ReportCase> {
    let case = match service.find_by_session_id(session_id).await {
        Ok(case) => case,
        Err(VaultVoiceError::NotFound(_)) => return Err(VaultVoiceError::Forbidden),
        Err(err) => return Err(err),
    };
    context.require_case(&case.id_hex())?;
    Ok(case)
}

pub async fn followup_thread(
    path: web::Path<String>,
    context: web::ReqData<AuthContext>,
    service: web::Data<WhistleblowerService>,
) -> Result<HttpResponse> {
    let case = owned_case(&service, &context, &path).await?;
    let view = service.case_view(&case).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn followup_reply(
    path: web::Path<String>,
    req: web::Json<PostMessageRequest>,
    context: web::ReqData<AuthContext>,
    service: web::Data<WhistleblowerService>,
    cases: web::Data<CaseService>,
) -> Result<HttpResponse> {
    let case = owned_case(&service, &context, &path).await?;
    let item = cases
        .save_new_thread_item(&case, req.into_inner(), ThreadItemSender::Whistleblower)
        .await?;
    Ok(HttpResponse::Created().json(item))
}
