#[macro_use]
extern crate tracing;

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use actix_web::{App, HttpServer};
use anyhow::Context;
use rand::Rng;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use expense_lib::auth::jwt::JWTAuth;
use expense_lib::config::Config;

const CONFIG_FILE_NAME: &str = "config.toml";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    tracing::subscriber::set_global_default(subscriber)?;
    info!("tracing initialized");

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Unable to load .env file"),
    }

    let config = match get_config_file() {
        Some(config_path) => {
            info!(path = %config_path.display(), "Reading config file");
            Config::from_file(config_path)?
        }
        None => {
            info!("No config file found, reading config from environment");
            Config::from_env()?
        }
    };

    let repos = match expense_repo::sqlx_repo::create_repos(
        &config.database_url,
        config.database_max_connections,
    )
    .await
    {
        Ok(repos) => repos,
        Err(e) => {
            error!(error = ?e, "Unable to connect to database");
            std::process::exit(1);
        }
    };

    let secret = get_secret()?;
    let jwt_auth = JWTAuth::from_secret(secret);
    let signups_enabled = config.signups_enabled;
    if !signups_enabled {
        warn!("Signups are disabled");
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(expense_lib::create_cors())
            .wrap(expense_lib::tracing::create_middleware())
            .configure(expense_lib::configure_app(
                jwt_auth.clone(),
                repos.clone(),
                signups_enabled,
            ))
    })
    .bind(("0.0.0.0", config.port))?;
    info!(port = config.port, "Server listening");

    server.run().await?;

    Ok(())
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from(CONFIG_FILE_NAME);
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn get_state_dir() -> PathBuf {
    if let Ok(state_env) = std::env::var("STATE_DIRECTORY") {
        return PathBuf::from(state_env);
    }

    PathBuf::from("data")
}

/// Uses `JWT_SECRET` when set. Otherwise the secret is read from the state directory, and
/// generated and saved there on first start.
fn get_secret() -> Result<Vec<u8>, anyhow::Error> {
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        if !secret.is_empty() {
            return Ok(secret.into_bytes());
        }
    }

    let state_dir = get_state_dir();
    let secret_file = state_dir.join("secret");
    if secret_file.exists() {
        fs::read(&secret_file)
            .with_context(|| format!("Unable to read {}", secret_file.display()))
    } else {
        let mut rng = rand::thread_rng();
        let mut secret: [u8; 128] = [0; 128];
        rng.fill(&mut secret);

        fs::create_dir_all(&state_dir).context("Unable to create state directory")?;
        fs::write(&secret_file, secret)
            .with_context(|| format!("Unable to write {}", secret_file.display()))?;
        info!(path = %secret_file.display(), "Generated new secret");

        Ok(secret.to_vec())
    }
}
