use actix_web::{get, web, HttpResponse};
use protocol::HealthResponse;

use crate::{db::Repositories, error::Result, service::AuthService};

#[get("/health")]
pub async fn health_check(
    repos: web::Data<Repositories>,
    auth: Option<web::Data<AuthService>>,
) -> Result<HttpResponse> {
    let active_sessions = auth
        .map(|auth| auth.sessions().active_session_count())
        .unwrap_or(0);

    let (mut response, database) = match repos.ping().await {
        Ok(()) => (HttpResponse::Ok(), "UP"),
        Err(err) => {
            log::error!("Health check database ping failed: {}", err);
            (HttpResponse::ServiceUnavailable(), "DOWN")
        }
    };

    let status = if database == "UP" { "UP" } else { "DEGRADED" };

    Ok(response.json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        active_sessions,
    }))
}
