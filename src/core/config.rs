//! Configurazione - caricata dalle variabili d'ambiente (e da `.env` se presente)

use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "un segreto meno bello";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub reminder_interval_secs: u64,
    pub app_env: String,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set in .env file".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| "16".to_string())
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let reminder_interval_secs = env::var("REMINDER_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<u64>()
            .map_err(|_| "Invalid REMINDER_INTERVAL_SECS: must be a positive number".to_string())?;

        if reminder_interval_secs == 0 {
            return Err("Invalid REMINDER_INTERVAL_SECS: must be greater than zero".to_string());
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            reminder_interval_secs,
            app_env,
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Environment: {}", self.app_env);
        info!("Server Address: {}:{}", self.server_host, self.server_port);
        info!("Database: {}", Self::mask_url(&self.database_url));
        info!("Max DB Connections: {}", self.max_connections);
        info!("Reminder interval: {}s", self.reminder_interval_secs);
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT Secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("JWT Secret: custom secret configured");
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let (Some(at_pos), Some(scheme_end)) = (url.find('@'), url.find("://")) {
            let scheme = &url[..scheme_end + 3];
            let after_at = &url[at_pos..];
            return format!("{}***{}", scheme, after_at);
        }
        // file based urls (sqlite) carry no credentials
        if url.starts_with("sqlite:") {
            return url.to_string();
        }
        "***".to_string()
    }
}
