use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use uuid::Uuid;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// The single tenant every row belongs to.
    pub owner_id: Uuid,
    pub log_level: String,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("PLURIDESK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PLURIDESK_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PLURIDESK_PORT must be a valid port number")?;

        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = env::var("PLURIDESK_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("PLURIDESK_DB_MAX_CONNECTIONS must be a number")?;
        let min_connections = env::var("PLURIDESK_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("PLURIDESK_DB_MIN_CONNECTIONS must be a number")?;

        let owner_id = env::var("PLURIDESK_OWNER_ID")
            .context("PLURIDESK_OWNER_ID must be set")?
            .parse()
            .context("PLURIDESK_OWNER_ID must be a valid UUID")?;

        let log_level = env::var("PLURIDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections,
                min_connections,
            },
            owner_id,
            log_level,
            service_name: "pluridesk-service".to_string(),
        })
    }
}
