use anyhow::{bail, Context};
use mongodb::Client;

use server::auth_token::AuthTokenService;
use server::config::{AppConfig, DatabaseBackend};
use server::db::{MongoDbContext, Repositories};
use server::service::AuthService;
use server::session::SessionManager;

#[derive(Debug)]
struct SeedConfig {
    config_path: String,
    username: Option<String>,
    display_name: String,
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let seed = parse_args()?;
    let username = seed
        .username
        .as_deref()
        .context("--username is required")?;
    let password = seed
        .password
        .clone()
        .or_else(|| std::env::var("SEED_INVESTIGATOR_PASSWORD").ok())
        .context("--password or SEED_INVESTIGATOR_PASSWORD is required")?;

    let config = AppConfig::load_from_file(&seed.config_path)
        .with_context(|| format!("Failed to load configuration from '{}'", seed.config_path))?;

    if config.database.backend == DatabaseBackend::Memory {
        bail!("database.backend is 'memory'; seeding it would be lost on exit");
    }

    let client = Client::with_uri_str(&config.database.uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let db_context = MongoDbContext::new(client, &config.database.name);
    db_context
        .init_indexes()
        .await
        .context("Failed to initialize database indexes")?;

    // Only account creation is used; the token secret just has to be valid.
    let tokens = AuthTokenService::new(
        config.auth.token_secret.clone().into_bytes(),
        config.auth.token_ttl(),
    )
    .context("Invalid auth.token_secret")?;
    let auth = AuthService::new(
        Repositories::mongo(db_context),
        SessionManager::new(config.auth.session_expiry_hours),
        tokens,
    );

    let investigator = auth
        .create_investigator(username, &seed.display_name, &password)
        .await
        .with_context(|| format!("Failed to create investigator '{}'", username))?;

    println!(
        "[seed-investigator] created '{}' ({}) id={}",
        investigator.username,
        investigator.display_name,
        investigator.id.map(|id| id.to_hex()).unwrap_or_default()
    );

    Ok(())
}

fn parse_args() -> anyhow::Result<SeedConfig> {
    let mut seed = SeedConfig {
        config_path: std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "server/config/vaultvoice.toml".to_string()),
        username: None,
        display_name: String::new(),
        password: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => seed.config_path = next_arg_value(&mut args, &arg)?,
            "--username" => seed.username = Some(next_arg_value(&mut args, &arg)?),
            "--name" => seed.display_name = next_arg_value(&mut args, &arg)?,
            "--password" => seed.password = Some(next_arg_value(&mut args, &arg)?),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}\nUse --help to list options.", other),
        }
    }

    Ok(seed)
}

fn next_arg_value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next()
        .with_context(|| format!("missing value for {}", flag))
}

fn print_help() {
    println!(
        "seed-investigator: create an investigator account\n\n\
         Usage: seed-investigator --username <name> [--name <display name>] [--password <pw>]\n\n\
         Options:\n  \
           --config <path>     config file (default: $CONFIG_PATH or server/config/vaultvoice.toml)\n  \
           --username <name>   login name\n  \
           --name <display>    display name shown in the dashboard (default: username)\n  \
           --password <pw>     password, or set SEED_INVESTIGATOR_PASSWORD"
    );
}
