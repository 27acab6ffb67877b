//! Runtime configuration, read once at boot from the environment (and `.env`
//! in development). Values are parsed through a lookup function so tests can
//! feed a map instead of mutating the process environment.

use std::time::Duration;

use chrono_tz::Tz;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DEMO_USER_ID: &str = "demo-user-id";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var}='{value}' is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Production deployments refuse to talk to Postgres without TLS.
    pub require_tls: bool,
}

/// Inclusive range of per-word delays for simulated streaming.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl StreamDelay {
    pub const NONE: StreamDelay = StreamDelay { min_ms: 0, max_ms: 0 };

    pub fn pick(&self) -> Duration {
        use rand::Rng;
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub storage: StorageBackend,
    /// Present whenever `storage` is `Postgres`
    pub database: Option<DatabaseConfig>,
    pub demo_user_id: String,
    pub cors_origins: Vec<String>,
    pub stream_delay: StreamDelay,
    pub timezone: Tz,
    pub rate_limit: bool,
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("SOVEREIGN_ENV")
            .or_else(|| get("NODE_ENV"))
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let storage = match get("SOVEREIGN_STORAGE").as_deref().map(str::trim) {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "SOVEREIGN_STORAGE",
                    value: other.to_string(),
                    reason: "expected 'postgres' or 'memory'".to_string(),
                });
            }
        };

        let database = match storage {
            StorageBackend::Postgres => {
                let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => raw
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ConfigError::Invalid {
                            var: "DATABASE_MAX_CONNECTIONS",
                            value: raw.clone(),
                            reason: "expected a positive integer".to_string(),
                        })?,
                    None => 10,
                };
                Some(DatabaseConfig {
                    url,
                    max_connections,
                    require_tls: environment == Environment::Production,
                })
            }
            StorageBackend::Memory => None,
        };

        let stream_delay = match get("SOVEREIGN_STREAM_DELAY_MS") {
            Some(raw) => parse_delay(&raw)?,
            None => StreamDelay { min_ms: 30, max_ms: 50 },
        };

        let timezone = match get("SOVEREIGN_TIMEZONE") {
            Some(raw) => raw.trim().parse::<Tz>().map_err(|e| ConfigError::Invalid {
                var: "SOVEREIGN_TIMEZONE",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => Tz::UTC,
        };

        let cors_origins = get("SOVEREIGN_CORS_ORIGINS")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            environment,
            port,
            storage,
            database,
            demo_user_id: get("SOVEREIGN_DEMO_USER_ID")
                .unwrap_or_else(|| DEFAULT_DEMO_USER_ID.to_string()),
            cors_origins,
            stream_delay,
            timezone,
            rate_limit: parse_flag(get("SOVEREIGN_RATE_LIMIT"), true),
            seed_demo: parse_flag(get("SOVEREIGN_SEED_DEMO"), false),
        })
    }
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_lowercase()) {
        Some(v) => matches!(v.as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

/// Accepts "40" or "30-50".
fn parse_delay(raw: &str) -> Result<StreamDelay, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "SOVEREIGN_STREAM_DELAY_MS",
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let parse = |s: &str| s.trim().parse::<u64>().map_err(|_| invalid("expected milliseconds"));

    let (min_ms, max_ms) = match raw.split_once('-') {
        Some((lo, hi)) => (parse(lo)?, parse(hi)?),
        None => {
            let fixed = parse(raw)?;
            (fixed, fixed)
        }
    };
    if min_ms > max_ms {
        return Err(invalid("lower bound exceeds upper bound"));
    }
    Ok(StreamDelay { min_ms, max_ms })
}
