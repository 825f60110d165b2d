use actix_web::{web, HttpResponse};
use protocol::ReportInput;

use crate::{error::Result, service::ReportService};

pub async fn create_report(
    req: web::Json<ReportInput>,
    reports: web::Data<ReportService>,
) -> Result<HttpResponse> {
    let saved = reports.save_report(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(saved))
}

pub async fn list_reports(reports: web::Data<ReportService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(reports.get_all_reports().await?))
}
