use actix_cors::Cors;
use actix_web::{
    error::JsonPayloadError,
    http::header,
    middleware::{from_fn, Logger},
    web, HttpRequest,
};

use crate::error::VaultVoiceError;
use crate::handlers;
use crate::middleware::{any_auth, investigator_auth, rate_limit_middleware, whistleblower_auth};
use crate::state::AppState;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            VaultVoiceError::PayloadTooLarge.into()
        }
        err => VaultVoiceError::Validation(err.to_string()).into(),
    }
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    VaultVoiceError::Validation(err.to_string()).into()
}

/// Browser access is limited to the configured frontend origin; `*` opens it up.
pub fn cors(origin: &str) -> Cors {
    let cors = if origin.trim() == "*" {
        Cors::default().allow_any_origin()
    } else {
        Cors::default().allowed_origin(origin.trim())
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .max_age(3600)
}

/// Access log keyed on the matched route pattern. Follow-up session ids live in
/// the path and must not reach the logs.
pub fn access_logger() -> Logger {
    Logger::new("%a \"%{route}xi\" %s %b %T").custom_request_replace("route", |req| {
        let pattern = req
            .match_pattern()
            .unwrap_or_else(|| "<unmatched>".to_string());
        format!("{} {}", req.method(), pattern)
    })
}

/// Registers shared state and every route of the API.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.repos.clone()))
        .app_data(web::Data::new(state.auth.clone()))
        .app_data(web::Data::new(state.whistleblowers.clone()))
        .app_data(web::Data::new(state.cases.clone()))
        .app_data(web::Data::new(state.reports.clone()))
        .app_data(web::Data::new(state.rate_limiter.clone()))
        .app_data(web::Data::new(state.public_key.clone()))
        .app_data(
            web::JsonConfig::default()
                .limit(state.max_body_bytes)
                .error_handler(json_error),
        )
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(handlers::health_check)
        .service(
            web::scope("/api")
                .service(
                    web::resource("/public-key").route(web::get().to(handlers::public_key)),
                )
                .service(
                    web::resource("/submit")
                        .wrap(from_fn(rate_limit_middleware))
                        .route(web::post().to(handlers::submit_report)),
                )
                .service(
                    web::scope("/followup")
                        .service(
                            web::resource("/login")
                                .wrap(from_fn(rate_limit_middleware))
                                .route(web::post().to(handlers::followup_login)),
                        )
                        .service(
                            web::resource("/{sessionId}/thread")
                                .wrap(from_fn(whistleblower_auth))
                                .route(web::get().to(handlers::followup_thread)),
                        )
                        .service(
                            web::resource("/{sessionId}/reply")
                                .wrap(from_fn(whistleblower_auth))
                                .route(web::post().to(handlers::followup_reply)),
                        ),
                )
                .service(
                    web::scope("/auth")
                        .service(
                            web::resource("/login")
                                .wrap(from_fn(rate_limit_middleware))
                                .route(web::post().to(handlers::login)),
                        )
                        .service(
                            web::resource("/logout")
                                .wrap(from_fn(any_auth))
                                .route(web::post().to(handlers::logout)),
                        ),
                )
                .service(
                    web::scope("/investigator")
                        .wrap(from_fn(investigator_auth))
                        .route("/cases", web::get().to(handlers::list_cases))
                        .route("/cases/{caseId}", web::get().to(handlers::case_details))
                        .route("/cases/{caseId}/status", web::put().to(handlers::update_status))
                        .route(
                            "/cases/{caseId}/classification",
                            web::put().to(handlers::update_classification),
                        )
                        .route("/cases/{caseId}/reply", web::post().to(handlers::reply)),
                )
                .service(
                    web::resource("/report")
                        .route(web::get().to(handlers::list_reports))
                        .route(web::post().to(handlers::create_report)),
                )
                .service(
                    web::resource("/report/init").route(web::post().to(handlers::create_report)),
                ),
        );
}
