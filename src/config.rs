use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub firecrawl_api_key: String,
    pub firecrawl_api_url: String,
    /// Upper bound for one extraction, submit and polling included.
    pub extract_timeout: Duration,
    pub poll_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, applying defaults for unset values.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let firecrawl_api_key = lookup("FIRECRAWL_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("FIRECRAWL_API_KEY is not set".to_string()))?;

        let firecrawl_api_url = lookup("FIRECRAWL_API_URL")
            .unwrap_or_else(|| DEFAULT_FIRECRAWL_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let timeout_secs = parse_number(&lookup, "EXTRACT_TIMEOUT_SECS", 90)?;
        let poll_ms = parse_number(&lookup, "EXTRACT_POLL_INTERVAL_MS", 2000)?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            firecrawl_api_key,
            firecrawl_api_url,
            extract_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(AppError::ConfigError(format!(
                "{} must be a positive integer, got {:?}",
                key, raw
            ))),
            Ok(value) => Ok(value),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[("FIRECRAWL_API_KEY", "fc-test")]).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.firecrawl_api_url, DEFAULT_FIRECRAWL_API_URL);
        assert_eq!(config.extract_timeout, Duration::from_secs(90));
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
    }

    #[test]
    fn requires_api_key() {
        assert!(matches!(config_from(&[]), Err(AppError::ConfigError(_))));
        assert!(matches!(
            config_from(&[("FIRECRAWL_API_KEY", "  ")]),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("FIRECRAWL_API_KEY", "fc-test"),
            ("FIRECRAWL_API_URL", "http://localhost:3002/"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("EXTRACT_TIMEOUT_SECS", "5"),
            ("EXTRACT_POLL_INTERVAL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.firecrawl_api_url, "http://localhost:3002");
        assert_eq!(config.extract_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            ("PORT", "http"),
            ("HOST", "not-an-ip"),
            ("EXTRACT_TIMEOUT_SECS", "0"),
            ("EXTRACT_POLL_INTERVAL_MS", "-1"),
        ] {
            let result = config_from(&[("FIRECRAWL_API_KEY", "fc-test"), (key, value)]);
            assert!(
                matches!(result, Err(AppError::ConfigError(_))),
                "{key}={value} should be rejected"
            );
        }
    }
}
