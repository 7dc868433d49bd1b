// src/config.rs

use anyhow::{Context, Result};
use std::{env, net::IpAddr, str::FromStr, time::Duration};
use url::Url;

use crate::client::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT};
use crate::parse::DEFAULT_ROW_LIMIT;

pub const DEFAULT_FEATURED_TABLE: &str = "Ibuar/mannfjoldi/1_yfirlit/Yfirlit_mannfjolda/MAN00000.px";

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub debug: bool,
    /// Default tracing directive when `RUST_LOG` is unset.
    pub log_level: String,
    pub base_url: Url,
    pub language: String,
    pub timeout: Duration,
    /// Table previewed on the index page.
    pub featured_table: String,
    /// `None` means no truncation.
    pub row_limit: Option<usize>,
    pub sample_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            debug: false,
            log_level: "info".to_string(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            featured_table: DEFAULT_FEATURED_TABLE.to_string(),
            row_limit: Some(DEFAULT_ROW_LIMIT),
            sample_fallback: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("HOST") {
            cfg.host = parse_var("HOST", &v)?;
        }
        if let Some(v) = get("PORT") {
            cfg.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("DEBUG") {
            cfg.debug = parse_flag(&v);
        }
        if let Some(v) = get("LOG_LEVEL") {
            cfg.log_level = v;
        }
        if let Some(v) = get("PXWEB_BASE_URL") {
            cfg.base_url =
                Url::parse(&v).with_context(|| format!("PXWEB_BASE_URL is not a URL: {}", v))?;
        }
        if let Some(v) = get("PXWEB_LANG") {
            cfg.language = v;
        }
        if let Some(v) = get("PXWEB_TIMEOUT_SECS") {
            cfg.timeout = Duration::from_secs(parse_var("PXWEB_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("PXWEB_FEATURED_TABLE") {
            cfg.featured_table = v;
        }
        if let Some(v) = get("PXWEB_ROW_LIMIT") {
            let limit: usize = parse_var("PXWEB_ROW_LIMIT", &v)?;
            cfg.row_limit = (limit > 0).then_some(limit);
        }
        if let Some(v) = get("PXWEB_SAMPLE_FALLBACK") {
            cfg.sample_fallback = parse_flag(&v);
        }

        Ok(cfg)
    }

    /// Tracing directive actually applied: debug mode overrides `LOG_LEVEL`.
    pub fn log_directive(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid value for {}: {:?}", key, raw))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.row_limit, Some(10));
        assert_eq!(cfg.language, "is");
        assert_eq!(cfg.log_directive(), "info");
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DEBUG", "True"),
            ("PXWEB_LANG", "en"),
            ("PXWEB_BASE_URL", "http://localhost:9000/api/v1"),
            ("PXWEB_TIMEOUT_SECS", "2"),
            ("PXWEB_ROW_LIMIT", "0"),
            ("PXWEB_SAMPLE_FALLBACK", "yes"),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 8080);
        assert!(cfg.debug);
        assert_eq!(cfg.log_directive(), "debug");
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.base_url.as_str(), "http://localhost:9000/api/v1");
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.row_limit, None);
        assert!(cfg.sample_fallback);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let cfg = Config::from_lookup(lookup(&[("PORT", "  "), ("PXWEB_LANG", "")])).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.language, "is");
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PXWEB_BASE_URL", "not a url")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PXWEB_ROW_LIMIT", "-1")])).is_err());
    }
}
