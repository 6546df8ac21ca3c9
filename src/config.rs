//! Service configuration, read from environment variables.

use std::env;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ALLOWED_DOMAINS: &str = "ag.ky.gov";
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 25 * 1024 * 1024;

// The opinion archive answers 403 to clients that don't look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";
pub const DEFAULT_REFERER: &str = "https://www.ag.ky.gov/Resources/orom/Pages/default.aspx";
pub const DEFAULT_SEC_CH_UA: &str =
    r#""Google Chrome";v="123", "Not:A-Brand";v="8", "Chromium";v="123""#;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub referer: String,
    pub sec_ch_ua: String,
    /// Hosts documents may be fetched from; subdomains are included.
    pub allowed_domains: Vec<String>,
    /// Largest document body accepted from the archive.
    pub max_document_bytes: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Missing or
    /// unparsable values fall back to the defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_domains = var("OAG_REFS_ALLOWED_DOMAINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_DOMAINS.to_string())
            .split(',')
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            bind_addr: var("OAG_REFS_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            fetch_timeout: Duration::from_secs(
                var("OAG_REFS_FETCH_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            user_agent: var("OAG_REFS_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            referer: var("OAG_REFS_REFERER").unwrap_or_else(|| DEFAULT_REFERER.to_string()),
            sec_ch_ua: var("OAG_REFS_SEC_CH_UA").unwrap_or_else(|| DEFAULT_SEC_CH_UA.to_string()),
            allowed_domains,
            max_document_bytes: var("OAG_REFS_MAX_DOCUMENT_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_DOCUMENT_BYTES),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.allowed_domains, vec!["ag.ky.gov".to_string()]);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.max_document_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("OAG_REFS_BIND", "0.0.0.0:8080"),
            ("OAG_REFS_FETCH_TIMEOUT_SECS", "5"),
            ("OAG_REFS_ALLOWED_DOMAINS", " AG.KY.GOV, example.org ,,"),
            ("OAG_REFS_MAX_DOCUMENT_BYTES", "1048576"),
        ]);
        assert_eq!(config.max_document_bytes, 1_048_576);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(
            config.allowed_domains,
            vec!["ag.ky.gov".to_string(), "example.org".to_string()]
        );
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = config_with(&[("OAG_REFS_FETCH_TIMEOUT_SECS", "soon")]);
        assert_eq!(config.fetch_timeout, Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));

        let config = config_with(&[("OAG_REFS_MAX_DOCUMENT_BYTES", "-1")]);
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }
}
