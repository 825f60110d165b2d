use actix_web::{web, HttpResponse};
use protocol::{InvestigatorLoginRequest, LogoutResponse};

use crate::{
    error::Result,
    service::{AuthContext, AuthService},
};

pub async fn login(
    req: web::Json<InvestigatorLoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let response = auth.investigator_login(&req.username, &req.password).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn logout(
    context: web::ReqData<AuthContext>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse> {
    let context = context.into_inner();
    auth.logout(&context.session_id);

    log::info!("{:?} logged out", context.principal.role);

    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: true,
        message: "Logout successful".to_string(),
    }))
}
