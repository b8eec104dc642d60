use crate::error::{FieldcalcError, Result};
use crate::models::metrics::AreaUnit;
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

/// Layered configuration for FieldCalc
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// UTM zone of the working projected CRS.
    pub zone: ConfigValue<u8>,
    /// Unit used when displaying areas.
    pub area_unit: ConfigValue<AreaUnit>,
    /// Fixed declination override; `None` means resolve per position.
    pub declination_override: ConfigValue<Option<f64>>,
    /// Whether external declination providers may be queried.
    pub online_lookup: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            zone: ConfigValue::new(36, ConfigSource::Default),
            area_unit: ConfigValue::new(AreaUnit::SquareMeters, ConfigSource::Default),
            declination_override: ConfigValue::new(None, ConfigSource::Default),
            online_lookup: ConfigValue::new(true, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| FieldcalcError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FieldcalcError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(zone) = file_config.zone {
            self.zone.update(zone, ConfigSource::File);
        }

        if let Some(area_unit) = file_config.area_unit {
            self.area_unit.update(area_unit, ConfigSource::File);
        }

        if let Some(declination) = file_config.declination {
            self.declination_override.update(Some(declination), ConfigSource::File);
        }

        if let Some(online_lookup) = file_config.online_lookup {
            self.online_lookup.update(online_lookup, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // FIELDCALC_ZONE
        if let Ok(zone_str) = env::var("FIELDCALC_ZONE") {
            match zone_str.parse::<u8>() {
                Ok(zone) if (1..=60).contains(&zone) => {
                    self.zone.update(zone, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid FIELDCALC_ZONE value '{}': expected integer 1..=60",
                    zone_str
                ),
            }
        }

        // FIELDCALC_AREA_UNIT
        if let Ok(unit_str) = env::var("FIELDCALC_AREA_UNIT") {
            match parse_area_unit(&unit_str) {
                Ok(unit) => self.area_unit.update(unit, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid FIELDCALC_AREA_UNIT value '{}': expected m2, ha, km2, or acres",
                    unit_str
                ),
            }
        }

        // FIELDCALC_DECLINATION
        if let Ok(decl_str) = env::var("FIELDCALC_DECLINATION") {
            match decl_str.parse::<f64>() {
                Ok(d) if d.is_finite() => {
                    self.declination_override.update(Some(d), ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid FIELDCALC_DECLINATION value '{}': expected finite degrees",
                    decl_str
                ),
            }
        }

        // FIELDCALC_ONLINE_LOOKUP
        if let Ok(online_str) = env::var("FIELDCALC_ONLINE_LOOKUP") {
            match parse_bool(&online_str) {
                Ok(online) => self.online_lookup.update(online, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid FIELDCALC_ONLINE_LOOKUP value '{}': expected true or false",
                    online_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(zone) = overrides.zone {
            self.zone.update(zone, ConfigSource::Cli);
        }

        if let Some(area_unit) = overrides.area_unit {
            self.area_unit.update(area_unit, ConfigSource::Cli);
        }

        if let Some(declination) = overrides.declination {
            self.declination_override.update(Some(declination), ConfigSource::Cli);
        }

        if let Some(online_lookup) = overrides.online_lookup {
            self.online_lookup.update(online_lookup, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "zone".to_string(),
            (format!("UTM {}N", self.zone.value), self.zone.source),
        );

        map.insert(
            "area_unit".to_string(),
            (format!("{:?}", self.area_unit.value), self.area_unit.source),
        );

        map.insert(
            "declination".to_string(),
            (
                match self.declination_override.value {
                    Some(d) => format!("{}°", d),
                    None => "auto".to_string(),
                },
                self.declination_override.source,
            ),
        );

        map.insert(
            "online_lookup".to_string(),
            (self.online_lookup.value.to_string(), self.online_lookup.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    zone: Option<u8>,
    area_unit: Option<AreaUnit>,
    declination: Option<f64>,
    online_lookup: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub zone: Option<u8>,
    pub area_unit: Option<AreaUnit>,
    pub declination: Option<f64>,
    pub online_lookup: Option<bool>,
}

/// Parse area unit from string
pub fn parse_area_unit(s: &str) -> Result<AreaUnit> {
    match s.to_lowercase().as_str() {
        "m2" | "sqm" | "square_meters" => Ok(AreaUnit::SquareMeters),
        "ha" | "hectares" => Ok(AreaUnit::Hectares),
        "km2" | "square_kilometers" => Ok(AreaUnit::SquareKilometers),
        "acres" | "acre" => Ok(AreaUnit::Acres),
        _ => Err(FieldcalcError::ConfigInvalid {
            key: "area_unit".to_string(),
            reason: format!("Invalid area unit: {}. Use m2, ha, km2, or acres", s),
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(FieldcalcError::ConfigInvalid {
            key: "online_lookup".to_string(),
            reason: format!("Invalid boolean: {}", s),
        }),
    }
}
