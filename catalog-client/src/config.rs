use crate::error::Error;
use chrono::Duration;
use fetch_cache::cache::CacheConfig;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use std::path::Path;
use url::Url;

/// Prefix of environment variables overriding file settings. Nested keys use `__`,
/// e.g. `STOREFRONT_CACHE__TTL_SECS`.
pub const ENV_PREFIX: &str = "STOREFRONT_";

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_CACHE_TTL_SECS: i64 = 30;
const DEFAULT_SWEEP_THRESHOLD: usize = 100;
/// Upper bound for `cache.ttl_secs`: one day.
pub const MAX_CACHE_TTL_SECS: i64 = 24 * 60 * 60;

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct Config {
    #[serde_inline_default(DEFAULT_API_URL.to_string())]
    #[getset(get = "pub")]
    api_url: String,
    #[serde_inline_default(30)]
    #[getset(get_copy = "pub")]
    timeout_secs: u64,
    #[serde(default)]
    #[getset(get = "pub")]
    cache: CacheSettings,
}

#[serde_inline_default]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct CacheSettings {
    #[serde_inline_default(DEFAULT_CACHE_TTL_SECS)]
    ttl_secs: i64,
    #[serde_inline_default(DEFAULT_SWEEP_THRESHOLD)]
    sweep_threshold: usize,
    #[serde_inline_default(true)]
    enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            cache: CacheSettings::default(),
        }
    }
}

impl Config {
    /// Load from an optional YAML file, then apply `STOREFRONT_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, Error> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        let ttl_secs = self.cache.ttl_secs;
        if !(0..=MAX_CACHE_TTL_SECS).contains(&ttl_secs) {
            return Err(Error::Validation(format!(
                "cache.ttl_secs must be between 0 and {}, got {}",
                MAX_CACHE_TTL_SECS, ttl_secs
            )));
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&self.api_url)?)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::try_seconds(self.cache.ttl_secs)
                .unwrap_or_else(|| Duration::seconds(DEFAULT_CACHE_TTL_SECS)),
            sweep_threshold: self.cache.sweep_threshold,
            enabled: self.cache.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_| {
            let config = Config::load(None).expect("defaults should load");

            assert_eq!(config, Config::default());
            assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:3001/");
            assert_eq!(config.cache_config().ttl, Duration::seconds(30));
            assert_eq!(config.cache_config().sweep_threshold, 100);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "storefront.yaml",
                "api_url: \"https://shop.example.com\"\ncache:\n  ttl_secs: 10\n",
            )?;
            jail.set_env("STOREFRONT_TIMEOUT_SECS", "5");
            jail.set_env("STOREFRONT_CACHE__ENABLED", "false");

            let config =
                Config::load(Some(Path::new("storefront.yaml"))).expect("config should load");

            assert_eq!(config.api_url(), "https://shop.example.com");
            assert_eq!(config.timeout_secs(), 5);
            assert_eq!(config.cache().ttl_secs(), 10);
            assert_eq!(config.cache().sweep_threshold(), 100);
            assert!(!config.cache_config().enabled);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_url_is_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("STOREFRONT_API_URL", "not a url");

            let config = Config::load(None).expect("config should load");
            assert!(matches!(config.base_url(), Err(Error::Url(_))));
            Ok(())
        });
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("STOREFRONT_CACHE__TTL_SECS", "10000000000000000");
            assert!(matches!(Config::load(None), Err(Error::Validation(_))));

            jail.set_env("STOREFRONT_CACHE__TTL_SECS", "100000000000000");
            assert!(matches!(Config::load(None), Err(Error::Validation(_))));

            jail.set_env("STOREFRONT_CACHE__TTL_SECS", "-5");
            assert!(matches!(Config::load(None), Err(Error::Validation(_))));

            jail.set_env("STOREFRONT_CACHE__TTL_SECS", "86400");
            let config = Config::load(None).expect("one day is accepted");
            assert_eq!(config.cache_config().ttl, Duration::days(1));
            Ok(())
        });
    }
}
