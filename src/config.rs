use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    estimate::{LevelBand, SalaryBands},
    normalize::Conversion,
    salary::Markers,
};

/// Everything the salary engine needs, loaded once and never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub conversion: Conversion,
    pub markers: Markers,
    pub bands: SalaryBands,
    /// Estimate salaries for postings that explicitly said "negotiable".
    pub estimate_negotiable: bool,
}

impl Config {
    pub const FILE_PATH: &str = "data/config.ron";

    /// Loads a config file, or the built-in defaults if there is none.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let Conversion {
            exchange_rate,
            scale_factor,
            whole_unit_threshold,
        } = self.conversion;
        if !(exchange_rate > 0.0 && scale_factor > 0.0 && whole_unit_threshold > 0.0) {
            return Err(Error::Config(format!(
                "conversion constants must be positive: {:?}",
                self.conversion,
            )));
        }

        for band in self.bands.levels.iter().chain([&self.bands.default_band]) {
            validate_band(band)?;
        }

        for bonus in &self.bands.bonuses {
            if bonus.keyword.trim().is_empty() {
                return Err(Error::Config("empty bonus keyword".to_string()));
            }
            if !(bonus.multiplier >= 1.0 && bonus.multiplier.is_finite()) {
                return Err(Error::Config(format!(
                    "bonus multiplier for {:?} must be at least 1.0, got {}",
                    bonus.keyword, bonus.multiplier,
                )));
            }
        }

        Ok(())
    }
}

fn validate_band(band: &LevelBand) -> Result<()> {
    if !band.is_valid() {
        return Err(Error::Config(format!(
            "band {:?} must have lower < upper, got [{}, {}]",
            band.level, band.lower, band.upper,
        )));
    }
    Ok(())
}
