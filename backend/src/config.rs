use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `None` runs the service on the in-memory account store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub time_zone: Tz,
    pub bind_addr: String,
    /// Empty means any origin.
    pub cors_allow_origins: Vec<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let jwt_secret = lookup("JWT_SECRET")
            .unwrap_or_else(|| "your-secret-key-change-this-in-production".to_string());

        let jwt_expiration_hours = lookup("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|| "1".to_string())
            .parse()
            .unwrap_or(1);

        let time_zone_name = lookup("APP_TIMEZONE").unwrap_or_else(|| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let cors_allow_origins = lookup("CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            database_url,
            db_max_connections,
            jwt_secret,
            jwt_expiration_hours,
            time_zone,
            bind_addr,
            cors_allow_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).expect("config");
        assert!(config.database_url.is_none());
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.jwt_expiration_hours, 1);
        assert_eq!(config.time_zone, chrono_tz::UTC);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.cors_allow_origins.is_empty());
    }

    #[test]
    fn parses_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://lifeline@localhost/lifeline"),
            ("APP_TIMEZONE", "Africa/Cairo"),
            ("CORS_ALLOW_ORIGINS", "https://console.example.org, http://localhost:8080,"),
            ("JWT_EXPIRATION_HOURS", "not-a-number"),
        ])
        .expect("config");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://lifeline@localhost/lifeline")
        );
        assert_eq!(config.time_zone, chrono_tz::Africa::Cairo);
        assert_eq!(
            config.cors_allow_origins,
            vec!["https://console.example.org", "http://localhost:8080"]
        );
        assert_eq!(config.jwt_expiration_hours, 1);
    }

    #[test]
    fn invalid_timezone_is_an_error() {
        assert!(config_from(&[("APP_TIMEZONE", "Mars/Olympus")]).is_err());
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).expect("config");
        assert!(config.database_url.is_none());
    }
}
