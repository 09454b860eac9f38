//! Application configuration
//!
//! This module provides centralized configuration management using the
//! `config` crate. Configuration can be loaded from environment variables
//! and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub notifier: NotifierConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Fulfillment gateway configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Gateway endpoint URL
    pub endpoint_url: String,

    /// API key sent with every delivery request
    pub api_key: String,

    /// Callback URL the gateway reports delivery results to
    pub callback_url: String,

    /// Request timeout in seconds; a timed-out delivery is a failed delivery
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

fn default_gateway_timeout() -> u64 {
    30
}

/// Operator notification (WhatsApp gateway) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    /// WhatsApp gateway endpoint URL
    pub endpoint_url: String,

    /// Gateway token
    pub api_key: String,

    /// Gateway instance identifier
    pub api_secret: String,

    /// Operator msisdn that receives manual-order alerts
    pub admin_msisdn: String,

    /// Request timeout in seconds
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

fn default_notifier_timeout() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("gateway.timeout_secs", 30)?
            .set_default("notifier.timeout_secs", 10)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with PULSA_ prefix
            .add_source(
                Environment::with_prefix("PULSA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            workers: 2,
        };
        let app = AppConfig {
            server: config,
            database: DatabaseConfig {
                url: "postgresql://localhost/pulsa_store".to_string(),
                max_connections: 5,
            },
            gateway: GatewayConfig {
                endpoint_url: "http://localhost/gateway".to_string(),
                api_key: "k".to_string(),
                callback_url: "http://localhost/callback".to_string(),
                timeout_secs: 30,
            },
            notifier: NotifierConfig {
                endpoint_url: "http://localhost/wa".to_string(),
                api_key: "k".to_string(),
                api_secret: "s".to_string(),
                admin_msisdn: "6281234567890".to_string(),
                timeout_secs: 10,
            },
        };
        assert_eq!(app.server_addr(), "127.0.0.1:9000");
    }
}
