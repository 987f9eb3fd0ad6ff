//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - SQLite connection string (default: `sqlite://supermarket.db?mode=rwc`)
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5, always 1 for in-memory databases)
//! - `NATS_URL` - Enables publishing notifications to NATS
//! - `NATS_SUBJECT` - Notification subject (default: `supermarket.notifications`)
//! - `SEED_DEMO_CATALOG` - Seed 500 demo products into an empty catalog (default: true)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
    pub nats_url: Option<String>,
    pub nats_subject: String,
    pub seed_demo_catalog: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8083,
            max_connections: 1,
            nats_url: None,
            nats_subject: "supermarket.notifications".to_string(),
            seed_demo_catalog: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://supermarket.db?mode=rwc".to_string());
        let host = parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parse_or(&lookup, "PORT", 8083u16)?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar("DATABASE_MAX_CONNECTIONS".into(), "must be at least 1".into()));
        }
        let nats_url = lookup("NATS_URL").filter(|u| !u.trim().is_empty());
        let nats_subject = lookup("NATS_SUBJECT").unwrap_or_else(|| "supermarket.notifications".to_string());
        let seed_demo_catalog = match lookup("SEED_DEMO_CATALOG") {
            None => true,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::InvalidEnvVar("SEED_DEMO_CATALOG".into(), format!("'{v}' is not a boolean")))?,
        };
        Ok(Self { database_url, host, port, max_connections, nats_url, nats_subject, seed_demo_catalog })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }

    pub fn is_in_memory(&self) -> bool { self.database_url.contains(":memory:") || self.database_url.contains("mode=memory") }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
