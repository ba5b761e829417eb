use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// The largest day window the sightings feed supports.
pub const MAX_DAYS_BACK: u32 = 14;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the taxonomy and hotspot cache files
    pub cache_dir: PathBuf,

    /// eBird API settings
    pub ebird: EbirdConfig,

    /// Cache expiry settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// eBird API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbirdConfig {
    /// eBird API key
    /// Request one at: https://ebird.org/api/keygen
    pub api_key: String,

    /// Base URL for the eBird API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Region code to pull hotspots from (e.g. "US-VA")
    #[serde(default = "default_region")]
    pub region: String,

    /// Day window for recent sightings, 1 to 14
    #[serde(default = "default_days_back")]
    pub days_back: u32,
}

fn default_api_url() -> String {
    "https://api.ebird.org/v2".to_string()
}

fn default_region() -> String {
    "US-VA".to_string()
}

fn default_days_back() -> u32 {
    MAX_DAYS_BACK
}

impl EbirdConfig {
    /// Check if an API key is configured (not a placeholder)
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_key.starts_with("YOUR_")
    }
}

impl Default for EbirdConfig {
    fn default() -> Self {
        Self {
            api_key: "YOUR_EBIRD_API_KEY".to_string(),
            api_url: default_api_url(),
            region: default_region(),
            days_back: default_days_back(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Days before the taxonomy cache file is regenerated
    #[serde(default = "default_taxonomy_expiry_days")]
    pub taxonomy_expiry_days: u64,

    /// Days before the hotspot cache file is regenerated
    #[serde(default = "default_hotspot_expiry_days")]
    pub hotspot_expiry_days: u64,
}

fn default_taxonomy_expiry_days() -> u64 {
    180
}

fn default_hotspot_expiry_days() -> u64 {
    1
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            taxonomy_expiry_days: default_taxonomy_expiry_days(),
            hotspot_expiry_days: default_hotspot_expiry_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("perch");

        Self {
            cache_dir,
            ebird: EbirdConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        config.validated()
    }

    /// Validate this config, logging warnings and failing on errors
    pub fn validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Validate eBird API URL
        self.validate_url(&self.ebird.api_url, "ebird.api_url", &mut result);

        // Validate the day window
        if self.ebird.days_back == 0 {
            result.add_error("ebird.days_back", "Day window must be at least 1");
        } else if self.ebird.days_back > MAX_DAYS_BACK {
            result.add_warning(
                "ebird.days_back",
                format!(
                    "Day windows beyond {} days return no sightings",
                    MAX_DAYS_BACK
                ),
            );
        }

        // Validate region code (two-letter country, optional subdivisions)
        if self.ebird.region.is_empty() {
            result.add_error("ebird.region", "Region code must not be empty");
        } else if !self
            .ebird
            .region
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            result.add_error(
                "ebird.region",
                format!("Invalid region code: {}", self.ebird.region),
            );
        }

        // Validate cache expiry settings
        if self.cache.taxonomy_expiry_days == 0 {
            result.add_warning(
                "cache.taxonomy_expiry_days",
                "Taxonomy cache disabled (0 days); every run refetches the full taxonomy",
            );
        }
        if self.cache.hotspot_expiry_days == 0 {
            result.add_warning(
                "cache.hotspot_expiry_days",
                "Hotspot cache disabled (0 days)",
            );
        }

        // Validate API key (just warn if not configured)
        if !self.ebird.is_configured() {
            result.add_warning(
                "ebird.api_key",
                "eBird API key not configured - API calls will be rejected",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("perch");

        Ok(config_dir.join("config.toml"))
    }
}
