use std::{net::SocketAddr, path::PathBuf};

use anyhow::{anyhow, Context};

use crate::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub storage_dir: PathBuf,
    pub public_base_url: String,
    pub admin_token: String,
    pub session_days: i64,
    pub upload_limit_bytes: usize,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads configuration from the process environment, after loading `.env`
    /// if one is present.
    pub fn from_env() -> anyhow::Result<Config> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let admin_token = lookup("ADMIN_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(anyhow!("ADMIN_TOKEN must be set to moderate content"))?;

        let session_days: i64 = var("SESSION_DAYS", "30")
            .parse()
            .context("SESSION_DAYS is not a number")?;
        let upload_limit_mb: usize = var("UPLOAD_LIMIT_MB", "25")
            .parse()
            .context("UPLOAD_LIMIT_MB is not a number")?;
        let upload_limit_bytes = upload_limit_mb
            .checked_mul(1024 * 1024)
            .context("UPLOAD_LIMIT_MB is too large")?;

        Ok(Config {
            database_url: var("DATABASE_URL", "sqlite://confetti.db"),
            bind_addr: var("BIND_ADDR", "0.0.0.0:8080")
                .parse()
                .context("BIND_ADDR is not a socket address")?,
            storage_dir: PathBuf::from(var("STORAGE_DIR", "./storage")),
            public_base_url: var("PUBLIC_BASE_URL", "http://localhost:8080"),
            admin_token,
            session_days,
            upload_limit_bytes,
            log_format: LogFormat::from_str(&var("LOG_FORMAT", "compact")),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = Config::from_lookup(lookup(&[("ADMIN_TOKEN", "s3cret")])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_days, 30);
        assert_eq!(config.upload_limit_bytes, 25 * 1024 * 1024);
        assert_eq!(config.storage_dir, PathBuf::from("./storage"));
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[test]
    fn missing_or_blank_token_is_rejected() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("ADMIN_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = Config::from_lookup(lookup(&[("ADMIN_TOKEN", "t"), ("SESSION_DAYS", "forever")]))
            .unwrap_err();
        assert!(err.to_string().contains("SESSION_DAYS"));
    }

    #[test]
    fn oversized_upload_limit_is_reported() {
        let huge = usize::MAX.to_string();
        let err = Config::from_lookup(lookup(&[("ADMIN_TOKEN", "t"), ("UPLOAD_LIMIT_MB", &huge)]))
            .unwrap_err();
        assert!(err.to_string().contains("UPLOAD_LIMIT_MB is too large"));
    }
}
