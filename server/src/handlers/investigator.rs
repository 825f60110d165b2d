use actix_web::{web, HttpResponse};
use protocol::{
    CaseListQuery, ClassificationUpdate, PostMessageRequest, ThreadItemSender, UpdateStatusQuery,
};

use crate::{error::Result, service::CaseService};

pub async fn list_cases(
    query: web::Query<CaseListQuery>,
    cases: web::Data<CaseService>,
) -> Result<HttpResponse> {
    let summaries = cases.find_all_case_summaries(query.status).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

pub async fn case_details(
    path: web::Path<String>,
    cases: web::Data<CaseService>,
) -> Result<HttpResponse> {
    let details = cases.case_details(&path).await?;
    Ok(HttpResponse::Ok().json(details))
}

pub async fn update_status(
    path: web::Path<String>,
    query: web::Query<UpdateStatusQuery>,
    cases: web::Data<CaseService>,
) -> Result<HttpResponse> {
    let summary = cases.update_status(&path, query.new_status).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn update_classification(
    path: web::Path<String>,
    req: web::Json<ClassificationUpdate>,
    cases: web::Data<CaseService>,
) -> Result<HttpResponse> {
    let summary = cases.update_classification(&path, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn reply(
    path: web::Path<String>,
    req: web::Json<PostMessageRequest>,
    cases: web::Data<CaseService>,
) -> Result<HttpResponse> {
    let case = cases.find_case(&path).await?;
    let item = cases
        .save_new_thread_item(&case, req.into_inner(), ThreadItemSender::Investigator)
        .await?;
    Ok(HttpResponse::Created().json(item))
}
