//! Configuration management for Regula
//!
//! Every simulated delay, the review timer, the download countdown, the
//! moderation threshold and the edit prices live here so tests and the CLI
//! can tune them. Values come from defaults, an optional TOML file and
//! `REGULA_<SECTION>_<KEY>` environment variables, in that order.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity store configuration
    pub identity: IdentityConfig,

    /// Catalog store configuration
    pub catalog: CatalogConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Identity store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Directory holding the persisted identity slot
    pub data_dir: PathBuf,

    /// Simulated latency of a registration
    #[serde(with = "humantime_serde")]
    pub register_latency: Duration,

    /// Simulated latency of a login
    #[serde(with = "humantime_serde")]
    pub login_latency: Duration,

    /// Simulated latency of a password reset request
    #[serde(with = "humantime_serde")]
    pub reset_latency: Duration,
}

/// How the existing report count of a package is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPolicy {
    /// Draw a fresh count in `0..10` on every report
    #[default]
    Sampled,
    /// Count the reports actually logged on the package
    Cumulative,
}

impl std::str::FromStr for ReportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sampled" => Ok(ReportPolicy::Sampled),
            "cumulative" => Ok(ReportPolicy::Cumulative),
            other => Err(format!("unknown report policy '{}'", other)),
        }
    }
}

/// Catalog store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Simulated latency of loading the featured items
    #[serde(with = "humantime_serde")]
    pub featured_latency: Duration,

    /// Simulated latency of a submission upload
    #[serde(with = "humantime_serde")]
    pub submit_latency: Duration,

    /// Delay between submission and the automated review verdict
    #[serde(with = "humantime_serde")]
    pub review_delay: Duration,

    /// Simulated latency of a rating
    #[serde(with = "humantime_serde")]
    pub rate_latency: Duration,

    /// Simulated latency of a moderation report
    #[serde(with = "humantime_serde")]
    pub report_latency: Duration,

    /// Simulated payment processing time of a paid edit
    #[serde(with = "humantime_serde")]
    pub edit_latency: Duration,

    /// Number of countdown ticks before a download counts
    pub download_countdown_ticks: u32,

    /// Length of one countdown tick
    #[serde(with = "humantime_serde")]
    pub download_tick: Duration,

    /// Draws at or below this value reject a submission
    pub rejection_ceiling: f64,

    /// Draws at or below this value tag a fresh submission as `warning`
    pub warning_ceiling: f64,

    /// Report count at which a package is flagged as spam
    pub report_threshold: u32,

    /// Source of the existing report count
    pub report_policy: ReportPolicy,

    /// Price of a basic edit
    pub basic_edit_price: u64,

    /// Price of a premium (major) edit
    pub premium_edit_price: u64,

    /// Currency label of the edit prices
    pub currency: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable metrics collection
    pub enabled: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("regula");

        Self {
            data_dir,
            register_latency: Duration::from_millis(1000),
            login_latency: Duration::from_millis(800),
            reset_latency: Duration::from_millis(1000),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            featured_latency: Duration::from_millis(500),
            submit_latency: Duration::from_secs(2),
            review_delay: Duration::from_secs(120),
            rate_latency: Duration::from_millis(500),
            report_latency: Duration::from_millis(500),
            edit_latency: Duration::from_millis(1500),
            download_countdown_ticks: 10,
            download_tick: Duration::from_secs(1),
            rejection_ceiling: 0.2,
            warning_ceiling: 0.3,
            report_threshold: 5,
            report_policy: ReportPolicy::Sampled,
            basic_edit_price: 3000,
            premium_edit_price: 7000,
            currency: "Kz AOA".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn parse_duration(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    humantime_serde::re::humantime::parse_duration(raw).map_err(|e| ConfigError::invalid(key, e))
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    raw.parse().map_err(|e| ConfigError::invalid(key, e))
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: REGULA_<SECTION>_<KEY>
    /// Example: REGULA_CATALOG_REVIEW_DELAY=30s
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the current values
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Identity config
        if let Ok(dir) = env::var("REGULA_IDENTITY_DATA_DIR") {
            self.identity.data_dir = PathBuf::from(dir);
        }

        // Catalog config
        if let Ok(delay) = env::var("REGULA_CATALOG_REVIEW_DELAY") {
            self.catalog.review_delay = parse_duration("catalog.review_delay", &delay)?;
        }
        if let Ok(tick) = env::var("REGULA_CATALOG_DOWNLOAD_TICK") {
            self.catalog.download_tick = parse_duration("catalog.download_tick", &tick)?;
        }
        if let Ok(threshold) = env::var("REGULA_CATALOG_REPORT_THRESHOLD") {
            self.catalog.report_threshold = threshold
                .parse()
                .map_err(|e| ConfigError::invalid("catalog.report_threshold", e))?;
        }
        if let Ok(policy) = env::var("REGULA_CATALOG_REPORT_POLICY") {
            self.catalog.report_policy = policy
                .parse()
                .map_err(|e| ConfigError::invalid("catalog.report_policy", e))?;
        }

        // Logging config
        if let Ok(level) = env::var("REGULA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = env::var("REGULA_LOG_JSON") {
            self.logging.json_format = parse_flag("logging.json_format", &json)?;
        }

        // Metrics config
        if let Ok(enabled) = env::var("REGULA_METRICS_ENABLED") {
            self.metrics.enabled = parse_flag("metrics.enabled", &enabled)?;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = &self.catalog;

        for (name, value) in [
            ("rejection_ceiling", catalog.rejection_ceiling),
            ("warning_ceiling", catalog.warning_ceiling),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if catalog.report_threshold == 0 {
            return Err(ConfigError::ValidationFailed(
                "report_threshold must be greater than 0".to_string(),
            ));
        }

        if catalog.basic_edit_price == 0 {
            return Err(ConfigError::ValidationFailed(
                "basic_edit_price must be greater than 0".to_string(),
            ));
        }

        if catalog.premium_edit_price < catalog.basic_edit_price {
            return Err(ConfigError::ValidationFailed(format!(
                "premium_edit_price ({}) must not be below basic_edit_price ({})",
                catalog.premium_edit_price, catalog.basic_edit_price
            )));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog.review_delay, Duration::from_secs(120));
        assert_eq!(config.catalog.download_countdown_ticks, 10);
        assert_eq!(config.catalog.report_threshold, 5);
        assert_eq!(config.catalog.basic_edit_price, 3000);
        assert_eq!(config.catalog.premium_edit_price, 7000);
        assert!(config.identity.data_dir.ends_with("regula"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.catalog.report_threshold = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.catalog.rejection_ceiling = 1.5;
        assert!(config.validate().is_err());

        config = Config::default();
        config.catalog.premium_edit_price = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();

        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            review_delay = "5s"
            report_policy = "cumulative"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.review_delay, Duration::from_secs(5));
        assert_eq!(config.catalog.report_policy, ReportPolicy::Cumulative);
        assert_eq!(config.catalog.submit_latency, Duration::from_secs(2));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regula.toml");

        let mut config = Config::default();
        config.catalog.report_threshold = 3;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.catalog.report_threshold, 3);
        assert_eq!(loaded.catalog.download_tick, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::from_file("/nonexistent/regula.toml");
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn test_report_policy_from_str() {
        assert_eq!("sampled".parse::<ReportPolicy>(), Ok(ReportPolicy::Sampled));
        assert_eq!("Cumulative".parse::<ReportPolicy>(), Ok(ReportPolicy::Cumulative));
        assert!("never".parse::<ReportPolicy>().is_err());
    }
}
