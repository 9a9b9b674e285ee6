use anyhow::Context;
use serde::Deserialize;
use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Deserialize, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_signups_enabled")]
    pub signups_enabled: bool,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_signups_enabled() -> bool {
    true
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Config::parse_toml(&config)
    }

    pub fn parse_toml(config: &str) -> Result<Config, anyhow::Error> {
        toml::from_str(config).context("Unable to parse config")
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from environment-style variables. Only `DATABASE_URL` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("Unable to read env var: DATABASE_URL")?;
        let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let signups_enabled = parse_var(&lookup, "SIGNUPS_ENABLED")?.unwrap_or(true);
        let database_max_connections =
            parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Ok(Config {
            database_url,
            port,
            signups_enabled,
            database_max_connections,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Unable to parse {} value", key)),
    }
}
