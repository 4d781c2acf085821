use crate::error::{Result, Stac4dError};
use crate::models::stac::COPC_MEDIA_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// What to do with a bbox whose source CRS is missing or unresolvable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrsFallback {
    /// Treat native coordinates as already geographic (lon/lat degrees)
    #[default]
    Geographic,
    /// Fail the extraction with `InvalidCrs`
    Reject,
}

/// Layered configuration for stac4d
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub target_crs: ConfigValue<String>,
    pub crs_fallback: ConfigValue<CrsFallback>,
    pub license: ConfigValue<String>,
    pub asset_media_type: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            target_crs: ConfigValue::new("EPSG:4326".to_string(), ConfigSource::Default),
            crs_fallback: ConfigValue::new(CrsFallback::Geographic, ConfigSource::Default),
            license: ConfigValue::new("CC-BY-4.0".to_string(), ConfigSource::Default),
            asset_media_type: ConfigValue::new(COPC_MEDIA_TYPE.to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| Stac4dError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| Stac4dError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(target_crs) = file_config.target_crs {
            self.target_crs.update(target_crs, ConfigSource::File);
        }

        if let Some(crs_fallback) = file_config.crs_fallback {
            self.crs_fallback.update(crs_fallback, ConfigSource::File);
        }

        if let Some(license) = file_config.license {
            self.license.update(license, ConfigSource::File);
        }

        if let Some(asset_media_type) = file_config.asset_media_type {
            self.asset_media_type.update(asset_media_type, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // STAC4D_TARGET_CRS
        if let Ok(target_crs) = env::var("STAC4D_TARGET_CRS") {
            if target_crs.trim().is_empty() {
                tracing::warn!("Ignoring empty STAC4D_TARGET_CRS");
            } else {
                self.target_crs.update(target_crs, ConfigSource::Environment);
            }
        }

        // STAC4D_CRS_FALLBACK
        if let Ok(fallback_str) = env::var("STAC4D_CRS_FALLBACK") {
            match parse_crs_fallback(&fallback_str) {
                Ok(fallback) => self.crs_fallback.update(fallback, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid STAC4D_CRS_FALLBACK value '{}': expected geographic or reject",
                    fallback_str
                ),
            }
        }

        // STAC4D_LICENSE
        if let Ok(license) = env::var("STAC4D_LICENSE") {
            self.license.update(license, ConfigSource::Environment);
        }

        // STAC4D_ASSET_MEDIA_TYPE
        if let Ok(media_type) = env::var("STAC4D_ASSET_MEDIA_TYPE") {
            self.asset_media_type.update(media_type, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(target_crs) = overrides.target_crs {
            self.target_crs.update(target_crs, ConfigSource::Cli);
        }

        if let Some(crs_fallback) = overrides.crs_fallback {
            self.crs_fallback.update(crs_fallback, ConfigSource::Cli);
        }

        if let Some(license) = overrides.license {
            self.license.update(license, ConfigSource::Cli);
        }

        if let Some(asset_media_type) = overrides.asset_media_type {
            self.asset_media_type.update(asset_media_type, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "target_crs".to_string(),
            (self.target_crs.value.clone(), self.target_crs.source),
        );

        map.insert(
            "crs_fallback".to_string(),
            (format!("{:?}", self.crs_fallback.value), self.crs_fallback.source),
        );

        map.insert("license".to_string(), (self.license.value.clone(), self.license.source));

        map.insert(
            "asset_media_type".to_string(),
            (self.asset_media_type.value.clone(), self.asset_media_type.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    target_crs: Option<String>,
    crs_fallback: Option<CrsFallback>,
    license: Option<String>,
    asset_media_type: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub target_crs: Option<String>,
    pub crs_fallback: Option<CrsFallback>,
    pub license: Option<String>,
    pub asset_media_type: Option<String>,
}

/// Parse the CRS fallback policy from string
pub fn parse_crs_fallback(s: &str) -> Result<CrsFallback> {
    match s.trim().to_lowercase().as_str() {
        "geographic" | "wgs84" => Ok(CrsFallback::Geographic),
        "reject" | "strict" => Ok(CrsFallback::Reject),
        _ => Err(Stac4dError::ConfigInvalid {
            key: "crs_fallback".to_string(),
            reason: format!("Invalid CRS fallback: {}. Use geographic or reject", s),
        }),
    }
}
