use std::time::Duration;

use crate::data::connection::ConnectionPolicy;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://mongodb-service:27017/productdb";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: Option<String>,
    pub retry_interval: Duration,
    pub server_selection_timeout: Duration,
    pub health_check_interval: Option<Duration>,
    pub degraded_mode: bool,
    pub swallow_uncaught_errors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let mongodb_uri = var("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.into());
        let mongodb_database = var("MONGODB_DATABASE");
        let retry_interval = Duration::from_secs(parse_secs(
            "DB_RETRY_INTERVAL_SECS",
            var("DB_RETRY_INTERVAL_SECS"),
            5,
        )?);
        let server_selection_timeout = Duration::from_secs(parse_secs(
            "DB_SERVER_SELECTION_TIMEOUT_SECS",
            var("DB_SERVER_SELECTION_TIMEOUT_SECS"),
            5,
        )?);
        let health_check_interval = match parse_secs(
            "DB_HEALTH_CHECK_INTERVAL_SECS",
            var("DB_HEALTH_CHECK_INTERVAL_SECS"),
            30,
        )? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let degraded_mode = parse_flag("DEGRADED_MODE", var("DEGRADED_MODE"), true)?;
        let swallow_uncaught_errors = parse_flag(
            "SWALLOW_UNCAUGHT_ERRORS",
            var("SWALLOW_UNCAUGHT_ERRORS"),
            true,
        )?;
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if retry_interval.is_zero() {
            anyhow::bail!("DB_RETRY_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            host,
            port,
            mongodb_uri,
            mongodb_database,
            retry_interval,
            server_selection_timeout,
            health_check_interval,
            degraded_mode,
            swallow_uncaught_errors,
            cors_origins,
        })
    }

    pub fn connection_policy(&self) -> ConnectionPolicy {
        ConnectionPolicy {
            retry_interval: self.retry_interval,
            health_check_interval: self.health_check_interval,
        }
    }
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> anyhow::Result<u64> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
    }
}

fn parse_flag(key: &str, value: Option<String>, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("invalid {}: {:?} is not a boolean", key, other)),
    }
}

/// Masks the password of a connection string so it can be logged.
pub fn redact_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => {
            let user = rest[..at].split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, &rest[at + 1..])
        }
        None => uri.to_string(),
    }
}
