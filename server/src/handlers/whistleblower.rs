use actix_web::{web, HttpResponse};
use protocol::{PublicKeyResponse, SubmitReportRequest};

use crate::{error::Result, service::WhistleblowerService, state::InvestigatorPublicKey};

pub async fn public_key(key: web::Data<InvestigatorPublicKey>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(PublicKeyResponse {
        investigator_public_key_pem: key.pem().to_string(),
    }))
}

pub async fn submit_report(
    req: web::Json<SubmitReportRequest>,
    service: web::Data<WhistleblowerService>,
) -> Result<HttpResponse> {
    let response = service.submit_new_report(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}
