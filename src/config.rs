use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::cache::CachePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Substituted on the request path when a submitted record carries no
    /// currency.
    pub default_currency: String,
    pub cache_max_entries: usize,
    pub cache_expire_after_write_secs: u64,
    pub cache_expire_after_access_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "CNY".to_string()),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            cache_expire_after_write_secs: env::var("CACHE_EXPIRE_AFTER_WRITE_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()?,
            cache_expire_after_access_secs: env::var("CACHE_EXPIRE_AFTER_ACCESS_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()?,
        })
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            max_entries: self.cache_max_entries,
            expire_after_write: Duration::from_secs(self.cache_expire_after_write_secs),
            expire_after_access: Duration::from_secs(self.cache_expire_after_access_secs),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.server_port == 0 {
            anyhow::bail!("SERVER_PORT must be greater than 0");
        }
        if self.default_currency.len() != 3
            || !self.default_currency.chars().all(|ch| ch.is_ascii_alphabetic())
        {
            anyhow::bail!("DEFAULT_CURRENCY must be a 3-letter currency code");
        }
        if self.cache_max_entries == 0 {
            anyhow::bail!("CACHE_MAX_ENTRIES must be greater than 0");
        }

        Ok(())
    }
}
