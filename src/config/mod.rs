pub mod auth;
pub mod database;
pub mod email;
pub mod providers;
pub mod server;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub email: email::EmailConfig,
    pub providers: providers::ProviderConfig,

    pub version: String,

    // Logging
    pub log_level: String,

    // Frontend, used to build links in outbound emails
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            auth: auth::AuthConfig::from_env(),
            email: email::EmailConfig::from_env(),
            providers: providers::ProviderConfig::from_env(),

            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("PASSPAD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            frontend_url: env::var("PASSPAD_FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
