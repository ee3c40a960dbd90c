/*!
Configuration management for the six-circle command-line tool.
*/

use serde::{Deserialize, Serialize};
use shared::diffractometer::GAMMA;
use shared::{HardwareConfig, SimConfig, SixcConfig};
use std::path::Path;
use anyhow::{bail, Context, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub diffractometer: SixcConfig,
    #[serde(default)]
    pub simulation: SimConfig,
    #[serde(default = "default_hardware")]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            diffractometer: SixcConfig::default(),
            simulation: SimConfig::default(),
            hardware: default_hardware(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// A non-positive `gamma.radius` is rejected while parsing. The mode and
    /// the presence of `gamma` among the reals are checked afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse diffractometer config {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid diffractometer config {}", path.display()))?;
        Ok(config)
    }

    /// Check the diffractometer section against its solver geometry
    pub fn validate(&self) -> Result<()> {
        let sixc = &self.diffractometer;
        if !sixc.geometry.reals.iter().any(|r| r == GAMMA) {
            bail!(
                "geometry '{}' has no '{}' real axis",
                sixc.geometry.geometry,
                GAMMA
            );
        }
        if let Some(mode) = &sixc.mode {
            sixc.geometry.check_mode(mode)?;
        }
        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Motor records of the 28-ID-C six-circle
fn default_hardware() -> HardwareConfig {
    HardwareConfig {
        prefix: "28idc:".to_string(),
        m_delta: "m1".to_string(),
        m_theta: "m2".to_string(),
        m_chi: "m3".to_string(),
        m_phi: "m4".to_string(),
        m_mu: "m5".to_string(),
        m_gamscrew: "m6".to_string(),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level: error, warn, info, debug or trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
