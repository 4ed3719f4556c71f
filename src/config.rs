//! Configuration management for the `Tripmeter` application
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::TripmeterError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `Tripmeter` application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TripmeterConfig {
    /// Routing backend configuration
    pub provider: ProviderConfig,
    /// Route building and fallback settings
    pub route: RouteConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Routing backend configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend identifier ("google" or "openroute")
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Backend API key, supplied via the process environment
    pub api_key: Option<String>,
    /// Base URL override (primarily for tests)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum attempts per lookup, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between retry attempts, in milliseconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Pause between consecutive lookups in a batch, in milliseconds
    #[serde(default = "default_pacing")]
    pub pacing_ms: u64,
}

/// Route building settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Origin substituted when a record carries no starting city
    #[serde(default = "default_origin")]
    pub default_origin: String,
    /// Country treated as domestic for region-based address formatting
    #[serde(default = "default_domestic_country")]
    pub domestic_country: String,
    /// Alternate origin anchor points tried when the primary origin fails
    #[serde(default = "default_fallback_origins")]
    pub fallback_origins: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_backend() -> String {
    "google".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_pacing() -> u64 {
    100
}

fn default_origin() -> String {
    "New York, NY".to_string()
}

fn default_domestic_country() -> String {
    "united states".to_string()
}

fn default_fallback_origins() -> Vec<String> {
    vec![
        "John F. Kennedy International Airport, Queens, NY".to_string(),
        "Newark Liberty International Airport, Newark, NJ".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TripmeterConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                backend: default_backend(),
                api_key: None,
                base_url: None,
                timeout_seconds: default_timeout(),
                max_attempts: default_max_attempts(),
                retry_delay_ms: default_retry_delay(),
                pacing_ms: default_pacing(),
            },
            route: RouteConfig {
                default_origin: default_origin(),
                domestic_country: default_domestic_country(),
                fallback_origins: default_fallback_origins(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

impl TripmeterConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides with TRIPMETER_ prefix, e.g.
        // TRIPMETER_PROVIDER__API_KEY supplies the backend credential.
        builder = builder.add_source(
            Environment::with_prefix("TRIPMETER")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripmeterConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripmeter").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.provider.backend.is_empty() {
            self.provider.backend = default_backend();
        }
        if self.provider.timeout_seconds == 0 {
            self.provider.timeout_seconds = default_timeout();
        }
        if self.provider.max_attempts == 0 {
            self.provider.max_attempts = default_max_attempts();
        }
        if self.route.default_origin.is_empty() {
            self.route.default_origin = default_origin();
        }
        if self.route.domestic_country.is_empty() {
            self.route.domestic_country = default_domestic_country();
        }
        if self.route.fallback_origins.is_empty() {
            self.route.fallback_origins = default_fallback_origins();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the backend credential. The batch never starts without one.
    pub fn validate_api_key(&self) -> Result<()> {
        let Some(api_key) = &self.provider.api_key else {
            return Err(TripmeterError::config(
                "Backend API key is required. Set TRIPMETER_PROVIDER__API_KEY in the environment.",
            )
            .into());
        };

        if api_key.is_empty() {
            return Err(TripmeterError::config(
                "Backend API key cannot be empty. Please check TRIPMETER_PROVIDER__API_KEY.",
            )
            .into());
        }

        if api_key.len() < 8 {
            return Err(TripmeterError::config(
                "Backend API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if api_key.len() > 200 {
            return Err(TripmeterError::config(
                "Backend API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.provider.timeout_seconds > 300 {
            return Err(
                TripmeterError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.provider.max_attempts > 10 {
            return Err(TripmeterError::config("Lookup attempts cannot exceed 10").into());
        }

        if self.provider.retry_delay_ms > 60_000 {
            return Err(
                TripmeterError::config("Retry delay cannot exceed 60000 milliseconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_backends = ["google", "openroute"];
        if !valid_backends.contains(&self.provider.backend.as_str()) {
            return Err(TripmeterError::config(format!(
                "Invalid backend '{}'. Must be one of: {}",
                self.provider.backend,
                valid_backends.join(", ")
            ))
            .into());
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripmeterError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripmeterError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if let Some(base_url) = &self.provider.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(TripmeterError::config(
                    "Backend base URL must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }
}
