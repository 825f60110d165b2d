use actix_web::{middleware as actix_middleware, App, HttpServer};
use anyhow::Context;
use mongodb::Client;
use std::time::Duration;
use tokio::time;

use server::auth_token::AuthTokenService;
use server::config::{AppConfig, DatabaseBackend};
use server::db::{MongoDbContext, Repositories};
use server::routes;
use server::session::SessionManager;
use server::state::{AppState, InvestigatorPublicKey};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting Vault Voice server...");
    log::info!("API version: {}", protocol::api_version());

    let config_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| "server/config/vaultvoice.toml".to_string());

    let config = AppConfig::load_from_file(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from '{}' (set CONFIG_PATH or run from the workspace root)",
            config_path
        )
    })?;

    let public_key = config
        .keys
        .load_public_key()
        .context("Investigator public key is required")?;

    let tokens = AuthTokenService::new(
        config.auth.token_secret.clone().into_bytes(),
        config.auth.token_ttl(),
    )
    .context("Invalid auth.token_secret (VAULT_VOICE__AUTH__TOKEN_SECRET)")?;

    let repos = match config.database.backend {
        DatabaseBackend::Mongo => {
            log::info!("Connecting to MongoDB database '{}'...", config.database.name);
            let client = Client::with_uri_str(&config.database.uri)
                .await
                .context("Failed to connect to MongoDB")?;

            let db_context = MongoDbContext::new(client, &config.database.name);

            log::info!("Initializing database indexes...");
            db_context
                .init_indexes()
                .await
                .context("Failed to initialize database indexes")?;

            Repositories::mongo(db_context)
        }
        DatabaseBackend::Memory => {
            log::warn!("Using the in-memory backend; data is lost on restart");
            Repositories::in_memory()
        }
    };

    let session_manager = SessionManager::new(config.auth.session_expiry_hours);
    log::info!(
        "Session expiry set to {} hours, token TTL {} minutes",
        config.auth.session_expiry_hours,
        config.auth.token_ttl_minutes
    );

    let state = AppState::new(
        repos,
        session_manager.clone(),
        tokens,
        InvestigatorPublicKey::new(public_key),
    )
    .with_max_body_bytes(config.server.max_body_bytes);

    // Spawn background cleanup tasks
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = session_manager.cleanup_expired();
            if removed > 0 {
                log::info!("Background cleanup: removed {} expired sessions", removed);
            }
        }
    });

    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(300)); // Every 5 minutes
        loop {
            interval.tick().await;
            rate_limiter.cleanup_old_entries();
            log::debug!(
                "Background cleanup: {} clients tracked by rate limiter",
                rate_limiter.tracked_clients()
            );
        }
    });

    let host = config.server.host.clone();
    let port = config.server.port;
    let cors_origin = config.server.cors_origin.clone();

    log::info!("Starting HTTP server at {}:{}...", host, port);
    log::info!("CORS origin: {}", cors_origin);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(routes::cors(&cors_origin))
            .wrap(routes::access_logger())
            .wrap(actix_middleware::Compress::default())
            .configure(move |cfg| routes::configure(cfg, &state))
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
